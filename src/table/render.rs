//! Text rendering.
//!
//! Rendering sorts a permutation of the rows, styles the visible ones,
//! sizes the columns from the styled text and then wraps every cell into
//! chunks that the assembler lays out side by side.

use std::fmt;

use super::{Row, Table};
use crate::cells::WidthMeasurer;
use crate::layout::{Budget, ColumnMeasure, allocate_widths};
use crate::wrap::{Chunk, Chunker};

/// A row ready for layout.
enum Line {
    Rule,
    Cells(Vec<String>),
}

impl Table {
    /// Render the table as text.
    ///
    /// Every line ends with `\n`. The stored rows are not reordered; the
    /// sort column only affects the output.
    #[must_use]
    pub fn render(&self) -> String {
        let lines: Vec<Line> = self
            .sorted_order()
            .into_iter()
            .map(|index| &self.rows[index])
            .filter(|row| self.row_visible(row))
            .map(|row| match row {
                Row::Rule => Line::Rule,
                Row::Cells(cells) => Line::Cells(
                    cells
                        .iter()
                        .zip(&self.props)
                        .map(|(cell, props)| props.style(cell))
                        .collect(),
                ),
            })
            .collect();
        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&self.props)
            .map(|(name, props)| props.style_header(name))
            .collect();

        let widths = self.column_widths(&header, &lines);
        let assembler = Assembler {
            measurer: &self.measurer,
            widths: &widths,
            indent: self.indent,
            cell_pad: self.cell_pad,
        };

        let mut out = self.prefix.clone();
        self.write_title(&mut out);

        let header_chunks = assembler.chunk_row(&header);
        assembler.write_row(&mut out, &header_chunks);
        let bar: Vec<String> = header_chunks
            .iter()
            .map(|chunks| "-".repeat(chunks.first().map_or(0, Chunk::width)))
            .collect();
        assembler.write_row(&mut out, &assembler.chunk_row(&bar));

        for line in &lines {
            match line {
                Line::Rule => out.push('\n'),
                Line::Cells(cells) => assembler.write_row(&mut out, &assembler.chunk_row(cells)),
            }
        }

        out.push_str(&self.postfix);
        out
    }

    fn write_title(&self, out: &mut String) {
        let Some(header) = &self.header else {
            return;
        };
        let pad = " ".repeat(self.header_indent);
        let underline = "=".repeat(self.measurer.display_width(header));
        out.push_str(&format!("{pad}{header}\n{pad}{underline}\n\n"));
    }

    /// Natural widths from the styled header and rows, then allocation.
    fn column_widths(&self, header: &[String], lines: &[Line]) -> Vec<usize> {
        let mut natural: Vec<usize> = header
            .iter()
            .map(|name| self.measurer.display_width(name))
            .collect();
        for line in lines {
            let Line::Cells(cells) = line else {
                continue;
            };
            for (width, cell) in natural.iter_mut().zip(cells) {
                *width = (*width).max(self.measurer.display_width(cell));
            }
        }

        let measures: Vec<ColumnMeasure> = natural
            .into_iter()
            .zip(&self.props)
            .map(|(natural, props)| ColumnMeasure {
                fixed: props.fixed_width(),
                natural,
            })
            .collect();
        allocate_widths(
            &measures,
            &Budget::new(self.width, self.indent, self.cell_pad),
        )
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Lays out one logical row per call.
struct Assembler<'a> {
    measurer: &'a WidthMeasurer,
    widths: &'a [usize],
    indent: usize,
    cell_pad: usize,
}

impl Assembler<'_> {
    fn chunk_row(&self, cells: &[String]) -> Vec<Vec<Chunk>> {
        cells
            .iter()
            .zip(self.widths)
            .map(|(cell, &width)| Chunker::new(self.measurer.catalog(), width).chunks(cell))
            .collect()
    }

    /// Interleave the columns' chunks into physical lines.
    ///
    /// A row always produces at least one line, even when every cell is
    /// empty.
    fn write_row(&self, out: &mut String, columns: &[Vec<Chunk>]) {
        let height = columns.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let mut line = String::new();
        for k in 0..height {
            line.clear();
            line.extend(std::iter::repeat_n(' ', self.indent));
            for (chunks, &width) in columns.iter().zip(self.widths) {
                let (text, used) = chunks
                    .get(k)
                    .map_or(("", 0), |chunk| (chunk.as_str(), chunk.width()));
                line.push_str(text);
                line.extend(std::iter::repeat_n(
                    ' ',
                    width.saturating_sub(used) + self.cell_pad,
                ));
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }
}
