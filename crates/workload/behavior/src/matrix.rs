//! Behavior matrices
//!
//! A [`BehaviorMatrix`] is the explicit form of one behavior model: a header
//! row followed by one row per service. Every row holds, per target service
//! and for the exit column, the cell `"<probability>; <think time>"`.
//!
//! ```text
//!        , Login* , Browse        , Checkout     , $
//! Login* , 0.0; n(0 0), 0.8; n(3000 300), 0.0; n(0 0), 0.2; n(0 0)
//! ```

use crate::errors::{BehaviorError, BehaviorResult};
use crate::think_time::{ThinkTimeFormatter, ThinkTimeFormatters};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use workload_types::{BehaviorModel, MarkovState, MarkovTarget, MarkovTransition, Service, ServiceId};

// ── Configuration ────────────────────────────────────────────────────

/// Rendering options for matrix files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixConfig {
    /// Cell separator within a line
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Label of the exit column
    #[serde(default = "default_exit_marker")]
    pub exit_marker: String,

    /// Suffix marking the initial service
    #[serde(default = "default_initial_marker")]
    pub initial_marker: String,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            exit_marker: default_exit_marker(),
            initial_marker: default_initial_marker(),
        }
    }
}

impl MatrixConfig {
    /// Check that the delimiter cannot occur inside a cell and that the
    /// markers keep every line at a fixed field count.
    pub fn validate(&self) -> BehaviorResult<()> {
        let d = self.delimiter;
        if d == ';' || d.is_whitespace() || d.is_alphanumeric() || "().-+".contains(d) {
            return Err(BehaviorError::InvalidConfig(format!(
                "delimiter '{}' can occur inside a cell",
                d.escape_default()
            )));
        }
        for (field, marker) in [
            ("exit_marker", &self.exit_marker),
            ("initial_marker", &self.initial_marker),
        ] {
            if marker.contains(d) || marker.contains(['\n', '\r']) {
                return Err(BehaviorError::InvalidConfig(format!(
                    "{} '{}' contains the delimiter or a line break",
                    field, marker
                )));
            }
        }
        Ok(())
    }
}

fn default_delimiter() -> char {
    ','
}

fn default_exit_marker() -> String {
    "$".to_string()
}

fn default_initial_marker() -> String {
    "*".to_string()
}

// ── Matrix ───────────────────────────────────────────────────────────

/// A rendered behavior matrix, header row first
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BehaviorMatrix {
    /// Name of the behavior model
    pub model: String,
    /// File name the matrix is written to
    pub filename: String,
    pub rows: Vec<Vec<String>>,
}

impl BehaviorMatrix {
    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or_default()
    }

    /// Service rows, without the header
    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or_default()
    }

    /// Number of service rows
    pub fn row_count(&self) -> usize {
        self.body().len()
    }

    /// Number of columns, label column included
    pub fn column_count(&self) -> usize {
        self.header().len()
    }

    /// The row whose label is `label`
    pub fn row(&self, label: &str) -> Option<&[String]> {
        self.body()
            .iter()
            .find(|row| row.first().map(String::as_str) == Some(label))
            .map(Vec::as_slice)
    }

    /// The cell at row `row_label`, column `column_label`
    pub fn cell(&self, row_label: &str, column_label: &str) -> Option<&str> {
        let column = self.header().iter().position(|h| h == column_label)?;
        self.row(row_label)?.get(column).map(String::as_str)
    }

    /// Probability of a cell, if it parses
    pub fn probability(&self, row_label: &str, column_label: &str) -> Option<f64> {
        self.cell(row_label, column_label)
            .and_then(split_cell)
            .map(|(p, _)| p)
    }

    /// Render as delimited text, one line per row
    pub fn to_delimited(&self, delimiter: char) -> String {
        let mut out = String::new();
        for row in &self.rows {
            out.push_str(&row.join(&delimiter.to_string()));
            out.push('\n');
        }
        out
    }
}

/// Split a cell into its probability and think time parts
pub fn split_cell(cell: &str) -> Option<(f64, &str)> {
    let (probability, think_time) = cell.split_once(';')?;
    let probability = probability.trim().parse::<f64>().ok()?;
    Some((probability, think_time.trim()))
}

/// Shortest round-trip rendering that always keeps a fractional part
pub fn format_probability(p: f64) -> String {
    format!("{:?}", p)
}

// ── Builder ──────────────────────────────────────────────────────────

enum Column<'a> {
    Service(&'a ServiceId),
    Exit,
}

/// Builds and writes behavior matrices
#[derive(Debug, Default)]
pub struct MatrixBuilder {
    config: MatrixConfig,
    formatters: ThinkTimeFormatters,
}

impl MatrixBuilder {
    pub fn new(config: MatrixConfig, formatters: ThinkTimeFormatters) -> Self {
        Self { config, formatters }
    }

    pub fn config(&self) -> &MatrixConfig {
        &self.config
    }

    pub fn formatters(&self) -> &ThinkTimeFormatters {
        &self.formatters
    }

    /// Build the matrix of one behavior model.
    ///
    /// `services` gives the rows and columns in declaration order;
    /// `initial_service` is labelled with the initial marker.
    pub fn build(
        &self,
        services: &[Service],
        initial_service: Option<&ServiceId>,
        model: &BehaviorModel,
    ) -> BehaviorResult<BehaviorMatrix> {
        self.config.validate()?;
        model.validate(services)?;

        let formatter = self.select_formatter(model)?;
        let label = |service: &Service| -> String {
            if Some(&service.id) == initial_service {
                format!("{}{}", service.name, self.config.initial_marker)
            } else {
                service.name.clone()
            }
        };

        for service in services {
            let text = label(service);
            if text.contains(self.config.delimiter) || text.contains(['\n', '\r']) {
                return Err(BehaviorError::UnrepresentableLabel {
                    model: model.name.clone(),
                    label: text,
                    delimiter: self.config.delimiter,
                });
            }
        }

        let mut rows = Vec::with_capacity(services.len() + 1);

        let mut header = Vec::with_capacity(services.len() + 2);
        header.push(String::new());
        header.extend(services.iter().map(label));
        header.push(self.config.exit_marker.clone());
        rows.push(header);

        for service in services {
            let state = model.state_for_service(&service.id);
            let mut row = Vec::with_capacity(services.len() + 2);
            row.push(label(service));
            for column in services.iter().map(|s| Column::Service(&s.id)).chain(std::iter::once(Column::Exit)) {
                let transition = state.and_then(|s| find_transition(model, s, &column));
                row.push(self.render_cell(model, formatter, transition)?);
            }
            rows.push(row);
        }

        tracing::debug!(
            model = %model.name,
            rows = services.len(),
            "Behavior matrix built"
        );

        Ok(BehaviorMatrix {
            model: model.name.clone(),
            filename: model.filename.clone(),
            rows,
        })
    }

    /// Write a matrix to `dir/<filename>`, returning the written path
    pub fn write(&self, matrix: &BehaviorMatrix, dir: &Path) -> BehaviorResult<PathBuf> {
        let path = dir.join(&matrix.filename);
        let write_err = |source: std::io::Error| BehaviorError::MatrixWrite {
            model: matrix.model.clone(),
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let file = std::fs::File::create(&path).map_err(write_err)?;
        let mut writer = std::io::BufWriter::new(file);
        writer
            .write_all(matrix.to_delimited(self.config.delimiter).as_bytes())
            .map_err(write_err)?;
        writer.flush().map_err(write_err)?;

        tracing::info!(model = %matrix.model, path = %path.display(), "Behavior matrix written");
        Ok(path)
    }

    /// The formatter for the think time kind of the first transition out
    /// of the model's initial state
    fn select_formatter(&self, model: &BehaviorModel) -> BehaviorResult<&dyn ThinkTimeFormatter> {
        let first = model
            .initial_state()
            .and_then(|s| s.transitions.first())
            .ok_or_else(|| BehaviorError::EmptyInitialState(model.name.clone()))?;
        let kind = first.think_time.kind();
        self.formatters
            .get(&kind)
            .ok_or_else(|| BehaviorError::UnknownThinkTimeType {
                model: model.name.clone(),
                kind,
            })
    }

    fn render_cell(
        &self,
        model: &BehaviorModel,
        formatter: &dyn ThinkTimeFormatter,
        transition: Option<&MarkovTransition>,
    ) -> BehaviorResult<String> {
        match transition {
            Some(t) => {
                let think_time = formatter.format(&t.think_time).ok_or_else(|| {
                    BehaviorError::UnknownThinkTimeType {
                        model: model.name.clone(),
                        kind: t.think_time.kind(),
                    }
                })?;
                Ok(format!("{}; {}", format_probability(t.probability), think_time))
            }
            None => Ok(format!(
                "{}; {}",
                format_probability(0.0),
                formatter.default_think_time()
            )),
        }
    }
}

fn find_transition<'a>(
    model: &BehaviorModel,
    state: &'a MarkovState,
    column: &Column<'_>,
) -> Option<&'a MarkovTransition> {
    state.transitions.iter().find(|t| match column {
        Column::Exit => t.target == MarkovTarget::Exit,
        Column::Service(id) => model.target_service(t.target) == Some(*id),
    })
}
