//! Column schema shared by partial outputs and the merged dataset
//!
//! Partial files carry the site's own (Bulgarian) labels, which are also the
//! labels found in listing markup. The merged dataset carries the English
//! labels. Both lists map 1:1 by position.

use std::fmt;

/// One column of the closed record schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Make,
    Model,
    Category,
    ProductionDate,
    EngineType,
    Transmission,
    Displacement,
    Power,
    EuroStandard,
    Mileage,
    WltpMileage,
    BatteryCapacity,
    Color,
    Vin,
    Price,
    Safety,
    Comfort,
    Other,
    Exterior,
    Protection,
    Interior,
    Specialized,
    Region,
    City,
    Views,
    Title,
}

impl Field {
    /// Every field in column order
    pub const ALL: [Field; 26] = [
        Field::Make,
        Field::Model,
        Field::Category,
        Field::ProductionDate,
        Field::EngineType,
        Field::Transmission,
        Field::Displacement,
        Field::Power,
        Field::EuroStandard,
        Field::Mileage,
        Field::WltpMileage,
        Field::BatteryCapacity,
        Field::Color,
        Field::Vin,
        Field::Price,
        Field::Safety,
        Field::Comfort,
        Field::Other,
        Field::Exterior,
        Field::Protection,
        Field::Interior,
        Field::Specialized,
        Field::Region,
        Field::City,
        Field::Views,
        Field::Title,
    ];

    /// Feature groups, listed under `label.extra_cat` headings on detail pages
    pub const FEATURE_GROUPS: [Field; 7] = [
        Field::Safety,
        Field::Comfort,
        Field::Other,
        Field::Exterior,
        Field::Protection,
        Field::Interior,
        Field::Specialized,
    ];

    /// Position of this field in both column lists
    pub fn index(self) -> usize {
        self as usize
    }

    /// Label used by the site and by partial output files
    pub fn source_label(self) -> &'static str {
        match self {
            Field::Make => "Марка",
            Field::Model => "Модел",
            Field::Category => "Категория",
            Field::ProductionDate => "Дата на производство",
            Field::EngineType => "Тип двигател",
            Field::Transmission => "Скоростна кутия",
            Field::Displacement => "Кубатура [куб.см]",
            Field::Power => "Мощност",
            Field::EuroStandard => "Евростандарт",
            Field::Mileage => "Пробег [км]",
            Field::WltpMileage => "Пробег с едно зареждане (WLTP) [км]",
            Field::BatteryCapacity => "Капацитет на батерията [kWh]",
            Field::Color => "Цвят",
            Field::Vin => "VIN номер",
            Field::Price => "Цена [лв./EUR]",
            Field::Safety => "Безопасност",
            Field::Comfort => "Комфорт",
            Field::Other => "Други",
            Field::Exterior => "Екстериор",
            Field::Protection => "Защита",
            Field::Interior => "Интериор",
            Field::Specialized => "Специализирани",
            Field::Region => "Област [Извън страната]",
            Field::City => "Населено място [Държава]",
            Field::Views => "Посещения",
            Field::Title => "Заглавие",
        }
    }

    /// Label used by the merged dataset
    pub fn output_label(self) -> &'static str {
        match self {
            Field::Make => "Make",
            Field::Model => "Model",
            Field::Category => "Body type",
            Field::ProductionDate => "Production date",
            Field::EngineType => "Engine type",
            Field::Transmission => "Transmission",
            Field::Displacement => "Displacement [cc]",
            Field::Power => "Power",
            Field::EuroStandard => "Euro standard",
            Field::Mileage => "Mileage [km]",
            Field::WltpMileage => "WLTP mileage",
            Field::BatteryCapacity => "Battery capacity [kWh]",
            Field::Color => "Color",
            Field::Vin => "VIN number",
            Field::Price => "Price [BGN/EUR]",
            Field::Safety => "Safety features",
            Field::Comfort => "Comfort features",
            Field::Other => "Other features",
            Field::Exterior => "Exterior features",
            Field::Protection => "Protection features",
            Field::Interior => "Interior features",
            Field::Specialized => "Specialized features",
            Field::Region => "Region (Outside country)",
            Field::City => "City (Country)",
            Field::Views => "Views",
            Field::Title => "Title",
        }
    }

    /// Looks up a field by its site label, ignoring surrounding whitespace
    pub fn from_source_label(label: &str) -> Option<Field> {
        let label = label.trim();
        Field::ALL.into_iter().find(|f| f.source_label() == label)
    }

    /// Looks up a field by its merged dataset label
    pub fn from_output_label(label: &str) -> Option<Field> {
        let label = label.trim();
        Field::ALL.into_iter().find(|f| f.output_label() == label)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.output_label())
    }
}

/// Header row of partial output files
pub fn source_header() -> Vec<&'static str> {
    Field::ALL.iter().map(|f| f.source_label()).collect()
}

/// Header row of the merged dataset
pub fn output_header() -> Vec<&'static str> {
    Field::ALL.iter().map(|f| f.output_label()).collect()
}
