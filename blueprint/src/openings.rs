// Distributed under the MIT License

//! Extractor de huecos: ventanas a partir de
//! pares de líneas cortas paralelas, puertas a partir de arcos de cuarto de
//! círculo o huecos de muro.

use crate::pdf::{PdfDocument, VectorPath};
use crate::rooms::{Opening, OpeningKind, Orientation};

const WINDOW_GAP_PX_RANGE: (f32, f32) = (2.0, 6.0);
const DOOR_ARC_RADIUS_FT_RANGE: (f32, f32) = (2.5, 4.0);

fn line_length(p0: (f32, f32), p1: (f32, f32)) -> f32 {
    ((p1.0 - p0.0).powi(2) + (p1.1 - p0.1).powi(2)).sqrt()
}

fn line_distance(a0: (f32, f32), a1: (f32, f32), b0: (f32, f32), b1: (f32, f32)) -> f32 {
    let ac = ((a0.0 + a1.0) / 2.0, (a0.1 + a1.1) / 2.0);
    let bc = ((b0.0 + b1.0) / 2.0, (b0.1 + b1.1) / 2.0);
    ((ac.0 - bc.0).powi(2) + (ac.1 - bc.1).powi(2)).sqrt()
}

/// Ventanas a partir de pares de líneas cortas y paralelas con una
/// separación de 2-6 px y longitud 1.5-12 ft (tras escala). Cada hueco se
/// devuelve junto a su punto medio en coordenadas de página (px), sin el
/// cual no habría forma de asignarlo a la sala que lo contiene.
pub fn extract_windows(doc: &PdfDocument, page_index: usize, px_per_ft: f32) -> Vec<(Opening, (f32, f32))> {
    let lines: Vec<((f32, f32), (f32, f32))> = doc
        .vectors_for_page(page_index)
        .filter_map(|e| match &e.path {
            VectorPath::Line { p0, p1 } => Some((*p0, *p1)),
            _ => None,
        })
        .collect();

    let mut windows = Vec::new();
    for i in 0..lines.len() {
        for j in (i + 1)..lines.len() {
            let (a0, a1) = lines[i];
            let (b0, b1) = lines[j];
            let len_a = line_length(a0, a1);
            let len_b = line_length(b0, b1);
            let length_ft = len_a / px_per_ft;
            if !(1.5..=12.0).contains(&length_ft) || (len_a - len_b).abs() > len_a * 0.2 {
                continue;
            }
            let gap = line_distance(a0, a1, b0, b1);
            if !(WINDOW_GAP_PX_RANGE.0..=WINDOW_GAP_PX_RANGE.1).contains(&gap) {
                continue;
            }
            let midpoint = (
                (a0.0 + a1.0 + b0.0 + b1.0) / 4.0,
                (a0.1 + a1.1 + b0.1 + b1.1) / 4.0,
            );
            windows.push((
                Opening {
                    kind: OpeningKind::Window,
                    width_ft: length_ft,
                    height_ft: 4.0,
                    orientation: Orientation::Unknown,
                    u_value: None,
                    shgc: None,
                },
                midpoint,
            ));
        }
    }
    windows
}

/// Puertas a partir de arcos de cuarto de círculo (radio 2.5-4 ft) o de
/// huecos de muro de 2.5-4 ft, junto a su centro en coordenadas de página.
pub fn extract_doors(doc: &PdfDocument, page_index: usize, px_per_ft: f32) -> Vec<(Opening, (f32, f32))> {
    let mut doors = Vec::new();
    for entry in doc.vectors_for_page(page_index) {
        if let VectorPath::Arc { radius, start_deg, end_deg, center } = &entry.path {
            let radius_ft = radius / px_per_ft;
            let sweep = (end_deg - start_deg).abs();
            if (DOOR_ARC_RADIUS_FT_RANGE.0..=DOOR_ARC_RADIUS_FT_RANGE.1).contains(&radius_ft)
                && (80.0..=100.0).contains(&sweep)
            {
                doors.push((
                    Opening {
                        kind: OpeningKind::Door,
                        width_ft: radius_ft,
                        height_ft: 6.67,
                        orientation: Orientation::Unknown,
                        u_value: None,
                        shgc: None,
                    },
                    *center,
                ));
            }
        }
    }
    doors
}

/// Lee una cartela de puerta/ventana (schedule) y resuelve un código de
/// marca de cuatro dígitos tipo "3050" (ancho 3'-0", alto 5'-0") o "2668"
/// (ancho 2'-6", alto 6'-8") a dimensiones en pies decimales. Cada par de
/// dígitos es `pies . pulgadas` con las pulgadas como dígito único (0-9).
pub fn parse_mark_code(mark: &str) -> Option<(f32, f32)> {
    let digits: String = mark.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 4 {
        return None;
    }
    let bytes = digits.as_bytes();
    let to_ft = |feet_digit: u8, inch_digit: u8| -> f32 {
        (feet_digit - b'0') as f32 + (inch_digit - b'0') as f32 / 12.0
    };
    let width_ft = to_ft(bytes[0], bytes[1]);
    let height_ft = to_ft(bytes[2], bytes[3]);
    if width_ft == 0.0 || height_ft == 0.0 {
        return None;
    }
    Some((width_ft, height_ft))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_code_3050_is_three_by_five() {
        let (w, h) = parse_mark_code("3050").unwrap();
        assert!((w - 3.0).abs() < 1e-6);
        assert!((h - 5.0).abs() < 1e-6);
    }

    #[test]
    fn mark_code_2668_is_two_six_by_six_eight() {
        let (w, h) = parse_mark_code("2668").unwrap();
        assert!((w - 2.5).abs() < 1e-6);
        assert!((h - 6.0 - 8.0 / 12.0).abs() < 1e-6);
    }

    #[test]
    fn mark_code_rejects_non_numeric() {
        assert!(parse_mark_code("ABCD").is_none());
    }
}
