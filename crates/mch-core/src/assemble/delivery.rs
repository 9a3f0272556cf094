use mch_model::DeliveryType;

/// Survey wording → delivery category, checked in order by substring.
pub const DELIVERY_RULES: &[(&str, DeliveryType)] = &[
    ("顺产", DeliveryType::Natural),
    ("剖腹产（剖宫产）", DeliveryType::CSection),
    ("紧急剖腹产", DeliveryType::EmergencyCSection),
];

/// Maps a delivery-method answer; the first rule whose text occurs wins.
pub fn remap_delivery_type(answer: &str) -> Option<DeliveryType> {
    DELIVERY_RULES
        .iter()
        .find(|(needle, _)| answer.contains(needle))
        .map(|(_, category)| *category)
}

/// Sheet values may already hold the category name; otherwise remap.
pub fn parse_delivery_type(value: &str) -> Option<DeliveryType> {
    value
        .parse::<DeliveryType>()
        .ok()
        .or_else(|| remap_delivery_type(value))
}
