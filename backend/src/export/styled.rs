//! Styled XLSX output with one background color per course.
//!
//! Colors come from a fixed pastel palette, assigned in first-seen order and
//! cycling after twelve courses. The mapping is rebuilt for every table.

use rust_xlsxwriter::{Color, Format, Workbook};
use std::collections::HashMap;

use super::{Cell, ReportTable};
use crate::error::ExportResult;

pub const FILE_NAME: &str = "converted.xlsx";
pub const CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Light pastels, readable under black text.
pub const PALETTE: [u32; 12] = [
    0xE3F2FD, // light blue
    0xF3E5F5, // light purple
    0xE8F5E9, // light green
    0xFFF3E0, // light orange
    0xFCE4EC, // light pink
    0xE0F2F1, // light teal
    0xFFF9C4, // light yellow
    0xE1BEE7, // light lavender
    0xBBDEFB, // light blue 2
    0xC8E6C9, // light green 2
    0xFFE0B2, // light orange 2
    0xF8BBD0, // light pink 2
];

/// Palette entry for the n-th distinct course.
pub fn color_for(first_seen_index: usize) -> u32 {
    PALETTE[first_seen_index % PALETTE.len()]
}

/// Course → color, in first-seen order of data rows.
#[derive(Debug, Clone, Default)]
pub struct CourseColors {
    order: Vec<String>,
    index: HashMap<String, usize>,
}

impl CourseColors {
    pub fn from_table(table: &ReportTable) -> Self {
        let mut colors = Self::default();
        for course in table.rows.iter().filter_map(|r| r.course.as_deref()) {
            if !colors.index.contains_key(course) {
                colors.index.insert(course.to_string(), colors.order.len());
                colors.order.push(course.to_string());
            }
        }
        colors
    }

    pub fn get(&self, course: &str) -> Option<u32> {
        self.index.get(course).map(|&i| color_for(i))
    }

    /// Distinct courses in first-seen order.
    pub fn courses(&self) -> &[String] {
        &self.order
    }
}

/// Write the table to an in-memory workbook.
pub fn write_xlsx(table: &ReportTable) -> ExportResult<Vec<u8>> {
    let colors = CourseColors::from_table(table);
    let formats: Vec<Format> = colors
        .courses()
        .iter()
        .enumerate()
        .map(|(i, _)| Format::new().set_background_color(Color::RGB(color_for(i))))
        .collect();
    let plain = Format::new();
    let header = Format::new().set_bold();

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Sheet1")?;

        for (col, name) in table.columns().iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *name, &header)?;
        }

        for (i, row) in table.rows.iter().enumerate() {
            let excel_row = (i + 1) as u32;
            let format = row
                .course
                .as_deref()
                .and_then(|c| colors.index.get(c))
                .map(|&idx| &formats[idx])
                .unwrap_or(&plain);
            let styled = row.course.is_some();

            for (col, cell) in row.cells.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Text(s) => {
                        sheet.write_string_with_format(excel_row, col, s.as_str(), format)?;
                    }
                    Cell::Number(n) => {
                        sheet.write_number_with_format(excel_row, col, *n as f64, format)?;
                    }
                    Cell::Empty if styled => {
                        sheet.write_blank(excel_row, col, format)?;
                    }
                    Cell::Empty => {}
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
