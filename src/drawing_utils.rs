//! Shared PDF operator builders
//!
//! Builders emit a flat list of objects in which each operator name is
//! followed by its operands, the same shape page content is accumulated in
//! before being grouped into [`Operation`]s. Coordinates are PDF points with
//! the origin at the bottom-left of the page.

use crate::style::Color;
use lopdf::{Object, StringFormat, content::Operation};

/// Operators the builders below emit; any other name is an operand
pub fn is_pdf_operator(name: &[u8]) -> bool {
    matches!(
        name,
        b"BT" | b"ET" | b"Tf" | b"Td" | b"Tj"
            | b"rg" | b"RG"
            | b"m" | b"l" | b"re" | b"S"
            | b"w" | b"d"
    )
}

/// Set stroke color and width for drawing operations
pub fn set_stroke_style(color: Color, width: f32) -> Vec<Object> {
    vec![
        Object::Name(b"RG".to_vec()),
        color.r.into(),
        color.g.into(),
        color.b.into(),
        Object::Name(b"w".to_vec()),
        width.into(),
    ]
}

/// Set the fill color, which also colors text
pub fn set_fill_color(color: Color) -> Vec<Object> {
    vec![
        Object::Name(b"rg".to_vec()),
        color.r.into(),
        color.g.into(),
        color.b.into(),
    ]
}

/// Set a dash pattern, or restore solid strokes with `None`
pub fn set_dash_pattern(pattern: Option<(f32, f32)>) -> Vec<Object> {
    let array = match pattern {
        Some((dash, gap)) => vec![dash.into(), gap.into()],
        None => Vec::new(),
    };
    vec![
        Object::Name(b"d".to_vec()),
        Object::Array(array),
        0.into(),
    ]
}

/// Draw a straight line segment
pub fn draw_line(x1: f32, y1: f32, x2: f32, y2: f32) -> Vec<Object> {
    vec![
        Object::Name(b"m".to_vec()),
        x1.into(),
        y1.into(),
        Object::Name(b"l".to_vec()),
        x2.into(),
        y2.into(),
        Object::Name(b"S".to_vec()),
    ]
}

/// Draw a stroked rectangle (outline only); `y` is the bottom edge
pub fn draw_rectangle_stroke(x: f32, y: f32, width: f32, height: f32) -> Vec<Object> {
    vec![
        Object::Name(b"re".to_vec()),
        x.into(),
        y.into(),
        width.into(),
        height.into(),
        Object::Name(b"S".to_vec()),
    ]
}

/// Show pre-encoded text with its baseline starting at (x, y)
pub fn show_text(
    font_resource: &str,
    font_size: f32,
    x: f32,
    y: f32,
    encoded: Vec<u8>,
    format: StringFormat,
) -> Vec<Object> {
    vec![
        Object::Name(b"BT".to_vec()),
        Object::Name(b"Tf".to_vec()),
        Object::Name(font_resource.as_bytes().to_vec()),
        font_size.into(),
        Object::Name(b"Td".to_vec()),
        x.into(),
        y.into(),
        Object::Name(b"Tj".to_vec()),
        Object::String(encoded, format),
        Object::Name(b"ET".to_vec()),
    ]
}

/// Group a flat object list into content operations.
///
/// Objects ahead of the first operator have nothing to attach to and are dropped.
pub fn objects_to_operations(objects: &[Object]) -> Vec<Operation> {
    let mut operations: Vec<Operation> = Vec::new();
    for object in objects {
        match object {
            Object::Name(name) if is_pdf_operator(name) => {
                operations.push(Operation::new(&String::from_utf8_lossy(name), Vec::new()));
            }
            operand => {
                if let Some(current) = operations.last_mut() {
                    current.operands.push(operand.clone());
                }
            }
        }
    }
    operations
}
