//! Labels
//!
//! Human-readable names for categories, materials, finishes, sizes and sides, and the
//! accounting line name built from them. Codes without a mapping are shown as given.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;

use crate::{
    money::{fraction, round2},
    request::{EstimateRequest, Sides},
    tables::codes_match,
};

const CATEGORY_LABELS: &[(&str, &str)] = &[
    ("SIGN", "Sign"),
    ("BANNER", "Banner"),
    ("DECAL", "Decal"),
    ("STICKER", "Sticker"),
    ("MAGNET", "Magnet"),
    ("BUSINESS_CARD", "Business Cards"),
    ("FLYER", "Flyers"),
    ("POSTCARD", "Postcards"),
    ("BROCHURE", "Brochures"),
];

const MATERIAL_LABELS: &[(&str, &str)] = &[
    ("COR4", "4mm Coroplast"),
    ("COR10", "10mm Coroplast"),
    ("ACP3", "3mm Aluminum Composite"),
    ("V13", "13oz Vinyl"),
    ("V8MESH", "8oz Mesh Vinyl"),
    ("CAST", "Cast Vinyl"),
    ("GENERIC_VINYL", "Vinyl"),
    ("14PT", "14pt Cardstock"),
    ("100LB", "100lb Gloss Text"),
];

const FINISH_LABELS: &[(&str, &str)] = &[
    ("MATTE", "Matte Laminate"),
    ("GLOSS", "Gloss Laminate"),
    ("HEMMED", "Hemmed Edges"),
    ("CONTOUR", "Contour Cut"),
];

/// Sides at or above this length, in inches, are shown in feet.
const FEET_THRESHOLD_IN: i64 = 24;

fn lookup(table: &[(&str, &str)], code: &str) -> String {
    table
        .iter()
        .find(|(key, _)| codes_match(key, code))
        .map_or_else(|| code.trim().to_string(), |(_, label)| (*label).to_string())
}

/// Display name for a category code.
pub fn category_label(code: &str) -> String {
    lookup(CATEGORY_LABELS, code)
}

/// Display name for a material code.
pub fn material_label(code: &str) -> String {
    lookup(MATERIAL_LABELS, code)
}

/// Display name for a finish code.
pub fn finish_label(code: &str) -> String {
    lookup(FINISH_LABELS, code)
}

/// `Single-Sided` or `Double-Sided`.
pub fn sides_label(sides: Sides) -> &'static str {
    match sides {
        Sides::Single => "Single-Sided",
        Sides::Double => "Double-Sided",
    }
}

/// Size as `2×6 ft` when the longer side is at least 24 inches, otherwise `3.5×2 in`.
pub fn size_label(width_in: Decimal, height_in: Decimal) -> String {
    if width_in.max(height_in) >= Decimal::from(FEET_THRESHOLD_IN) {
        let twelve = Decimal::from(12);

        format!(
            "{}×{} ft",
            number(width_in / twelve),
            number(height_in / twelve)
        )
    } else {
        format!("{}×{} in", number(width_in), number(height_in))
    }
}

/// A percentage as `10%`.
pub fn percent_label(percentage: Percentage) -> String {
    format!("{}%", number(fraction(percentage) * Decimal::ONE_HUNDRED))
}

fn number(value: Decimal) -> String {
    round2(value).normalize().to_string()
}

/// Product description for the base line: category, material, size and sides.
pub fn product_description(request: &EstimateRequest) -> String {
    product_parts(request).join(" - ")
}

/// Accounting line name: the product description plus the finish.
///
/// `None` when the request has no category.
pub fn line_name(request: &EstimateRequest) -> Option<String> {
    request.category.as_deref().filter(|code| !code.trim().is_empty())?;

    let mut parts = product_parts(request);

    if let Some(finish) = non_blank(request.finish.as_deref()) {
        parts.push(finish_label(finish));
    }

    Some(parts.join(" - "))
}

fn product_parts(request: &EstimateRequest) -> Vec<String> {
    let mut parts = Vec::with_capacity(5);

    if let Some(category) = non_blank(request.category.as_deref()) {
        parts.push(category_label(category));
    }

    if let Some(material) = non_blank(request.material.as_deref()) {
        parts.push(material_label(material));
    }

    if let Some((width_in, height_in)) = request.dimensions() {
        parts.push(size_label(width_in, height_in));
    }

    parts.push(sides_label(request.sides).to_string());

    parts
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_codes_fall_back_to_the_code() {
        assert_eq!(category_label("sign"), "Sign");
        assert_eq!(category_label("TABLECLOTH"), "TABLECLOTH");
        assert_eq!(material_label(" XYZ "), "XYZ");
    }

    #[test]
    fn large_sizes_are_shown_in_feet() {
        assert_eq!(size_label(Decimal::from(24), Decimal::from(72)), "2×6 ft");
        assert_eq!(size_label(Decimal::from(48), Decimal::from(96)), "4×8 ft");
        assert_eq!(size_label(Decimal::from(18), Decimal::from(24)), "1.5×2 ft");
    }

    #[test]
    fn small_sizes_are_shown_in_inches() {
        assert_eq!(size_label(Decimal::new(35, 1), Decimal::from(2)), "3.5×2 in");
        assert_eq!(size_label(Decimal::new(850, 2), Decimal::from(11)), "8.5×11 in");
    }

    #[test]
    fn percent_label_drops_trailing_zeros() {
        assert_eq!(percent_label(Percentage::from(Decimal::new(10, 2))), "10%");
        assert_eq!(percent_label(Percentage::from(Decimal::new(125, 3))), "12.5%");
    }

    #[test]
    fn line_name_joins_known_parts() {
        let request = EstimateRequest::new("BANNER")
            .material("V13")
            .size(Decimal::from(24), Decimal::from(72))
            .finish("HEMMED");

        assert_eq!(
            line_name(&request).as_deref(),
            Some("Banner - 13oz Vinyl - 2×6 ft - Single-Sided - Hemmed Edges")
        );
        assert_eq!(
            product_description(&request),
            "Banner - 13oz Vinyl - 2×6 ft - Single-Sided"
        );
    }

    #[test]
    fn line_name_skips_absent_parts() {
        let request = EstimateRequest::new("DECAL").sides(Sides::Double);

        assert_eq!(line_name(&request).as_deref(), Some("Decal - Double-Sided"));
        assert_eq!(line_name(&EstimateRequest::default()), None);
    }
}
