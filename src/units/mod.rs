// ==========================================
// 表格数据导入引擎 - 内置单位换算表
// ==========================================
// 职责: UnitConverter 的缺省实现(能量/质量/长度/体积)
// 约束: 未知单位与跨量纲换算都失败,不做静默猜测
// ==========================================

use crate::importer::contracts::UnitConverter;
use crate::importer::error::{ImportError, ImportResult};
use once_cell::sync::Lazy;
use std::collections::HashMap;

// ==========================================
// 量纲
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Energy,
    Mass,
    Length,
    Volume,
}

// 符号 → (量纲, 对量纲基准单位的倍率)
// 基准: 能量=wh, 质量=g, 长度=m, 体积=l
static UNIT_TABLE: Lazy<HashMap<&'static str, (Dimension, f64)>> = Lazy::new(|| {
    use Dimension::*;
    let mut table = HashMap::new();

    // ===== 能量 =====
    table.insert("wh", (Energy, 1.0));
    table.insert("watt_hours", (Energy, 1.0));
    table.insert("kwh", (Energy, 1.0e3));
    table.insert("kilowatt_hours", (Energy, 1.0e3));
    table.insert("mwh", (Energy, 1.0e6));
    table.insert("megawatt_hours", (Energy, 1.0e6));
    table.insert("gwh", (Energy, 1.0e9));
    table.insert("gigawatt_hours", (Energy, 1.0e9));
    table.insert("j", (Energy, 1.0 / 3600.0));
    table.insert("joules", (Energy, 1.0 / 3600.0));
    table.insert("kj", (Energy, 1.0e3 / 3600.0));
    table.insert("mj", (Energy, 1.0e6 / 3600.0));
    table.insert("gj", (Energy, 1.0e9 / 3600.0));
    table.insert("btu", (Energy, 0.293_071_07));
    table.insert("btus", (Energy, 0.293_071_07));

    // ===== 质量 =====
    table.insert("g", (Mass, 1.0));
    table.insert("grams", (Mass, 1.0));
    table.insert("kg", (Mass, 1.0e3));
    table.insert("kilograms", (Mass, 1.0e3));
    table.insert("t", (Mass, 1.0e6));
    table.insert("tonnes", (Mass, 1.0e6));
    table.insert("metric_tons", (Mass, 1.0e6));
    table.insert("lbs", (Mass, 453.592_37));
    table.insert("pounds", (Mass, 453.592_37));
    table.insert("tons", (Mass, 907_184.74));
    table.insert("short_tons", (Mass, 907_184.74));
    table.insert("oz", (Mass, 28.349_523_125));
    table.insert("ounces", (Mass, 28.349_523_125));

    // ===== 长度 =====
    table.insert("m", (Length, 1.0));
    table.insert("meters", (Length, 1.0));
    table.insert("km", (Length, 1.0e3));
    table.insert("kilometers", (Length, 1.0e3));
    table.insert("cm", (Length, 1.0e-2));
    table.insert("mm", (Length, 1.0e-3));
    table.insert("mi", (Length, 1_609.344));
    table.insert("miles", (Length, 1_609.344));
    table.insert("ft", (Length, 0.3048));
    table.insert("feet", (Length, 0.3048));
    table.insert("in", (Length, 0.0254));
    table.insert("inches", (Length, 0.0254));
    table.insert("yd", (Length, 0.9144));
    table.insert("yards", (Length, 0.9144));

    // ===== 体积 =====
    table.insert("l", (Volume, 1.0));
    table.insert("liters", (Volume, 1.0));
    table.insert("litres", (Volume, 1.0));
    table.insert("ml", (Volume, 1.0e-3));
    table.insert("gal", (Volume, 3.785_411_784));
    table.insert("gallons", (Volume, 3.785_411_784));
    table.insert("cubic_meters", (Volume, 1.0e3));
    table.insert("barrels", (Volume, 158.987_294_928));

    table
});

// ==========================================
// SiUnitConverter
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct SiUnitConverter;

impl SiUnitConverter {
    fn lookup(symbol: &str) -> ImportResult<(Dimension, f64)> {
        UNIT_TABLE
            .get(symbol)
            .copied()
            .ok_or_else(|| ImportError::UnknownUnit(symbol.to_string()))
    }
}

impl UnitConverter for SiUnitConverter {
    fn convert(&self, value: f64, from: &str, to: &str) -> ImportResult<f64> {
        let (from_dim, from_factor) = Self::lookup(from)?;
        let (to_dim, to_factor) = Self::lookup(to)?;
        if from_dim != to_dim {
            return Err(ImportError::IncompatibleUnits {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(value * from_factor / to_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(value: f64, from: &str, to: &str) -> f64 {
        SiUnitConverter.convert(value, from, to).unwrap()
    }

    #[test]
    fn test_energy_conversion() {
        assert!((convert(10.0, "mwh", "kwh") - 10_000.0).abs() < 1e-9);
        assert!((convert(1.0, "kwh", "mj") - 3.6).abs() < 1e-9);
    }

    #[test]
    fn test_mass_conversion() {
        assert!((convert(1.0, "kg", "lbs") - 2.204_622_621_8).abs() < 1e-6);
        assert!((convert(2.0, "tonnes", "kg") - 2_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_identity_conversion() {
        assert!((convert(5.5, "kwh", "kwh") - 5.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_unit_fails() {
        let result = SiUnitConverter.convert(1.0, "fortnights", "kwh");
        assert!(matches!(result, Err(ImportError::UnknownUnit(u)) if u == "fortnights"));
    }

    #[test]
    fn test_incompatible_dimensions_fail() {
        let result = SiUnitConverter.convert(1.0, "kg", "kwh");
        assert!(matches!(result, Err(ImportError::IncompatibleUnits { .. })));
    }
}
