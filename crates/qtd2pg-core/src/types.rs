use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Altitude in meters, in the representation selected by
/// [`crate::AltitudeType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Altitude {
    Integer(i32),
    Decimal(Decimal),
}

impl Altitude {
    #[must_use]
    pub fn as_decimal(self) -> Decimal {
        match self {
            Altitude::Integer(meters) => Decimal::from(meters),
            Altitude::Decimal(meters) => meters,
        }
    }
}

impl std::fmt::Display for Altitude {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Altitude::Integer(meters) => write!(f, "{meters}"),
            Altitude::Decimal(meters) => write!(f, "{meters}"),
        }
    }
}

/// One GPS fix read from a video, in WGS84 signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateSample {
    pub longitude: f64,
    pub latitude: f64,
    pub altitude: Altitude,
}

/// Everything the extractor learns about one video.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    /// Samples in capture order.
    pub samples: Vec<CoordinateSample>,
    /// `<prefix>_<creation date>` with separators replaced by underscores.
    pub default_identifier: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryMode {
    Point,
    Line,
    Both,
}

impl std::fmt::Display for GeometryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryMode::Point => write!(f, "point"),
            GeometryMode::Line => write!(f, "line"),
            GeometryMode::Both => write!(f, "both"),
        }
    }
}

impl std::str::FromStr for GeometryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "point" => Ok(GeometryMode::Point),
            "line" => Ok(GeometryMode::Line),
            "both" => Ok(GeometryMode::Both),
            other => Err(format!(
                "unknown geometry mode '{other}'; expected point, line or both"
            )),
        }
    }
}

/// Which of the two table layouts a table follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Point,
    Line,
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableKind::Point => write!(f, "point"),
            TableKind::Line => write!(f, "line"),
        }
    }
}

/// The tables a batch writes to, one variant per geometry mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetTables {
    Point { point: String },
    Line { line: String },
    Both { point: String, line: String },
}

impl TargetTables {
    /// Resolve table names using the positional convention: index 0 is the
    /// point table (or the only table in line mode), index 1 is the line table
    /// in both mode.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when a required name is missing
    /// or blank, or when both names are equal.
    pub fn from_names(mode: GeometryMode, names: &[String]) -> Result<Self, String> {
        let name_at = |index: usize| -> Result<String, String> {
            names
                .get(index)
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .ok_or_else(|| format!("{mode} mode requires a table name at position {index}"))
        };

        match mode {
            GeometryMode::Point => Ok(TargetTables::Point { point: name_at(0)? }),
            GeometryMode::Line => Ok(TargetTables::Line { line: name_at(0)? }),
            GeometryMode::Both => {
                let point = name_at(0)?;
                let line = name_at(1)?;
                if point == line {
                    return Err(format!(
                        "point and line tables must differ (both are '{point}')"
                    ));
                }
                Ok(TargetTables::Both { point, line })
            }
        }
    }

    #[must_use]
    pub fn mode(&self) -> GeometryMode {
        match self {
            TargetTables::Point { .. } => GeometryMode::Point,
            TargetTables::Line { .. } => GeometryMode::Line,
            TargetTables::Both { .. } => GeometryMode::Both,
        }
    }

    /// Tables with their layout, point table first.
    #[must_use]
    pub fn tables(&self) -> Vec<(TableKind, &str)> {
        match self {
            TargetTables::Point { point } => vec![(TableKind::Point, point.as_str())],
            TargetTables::Line { line } => vec![(TableKind::Line, line.as_str())],
            TargetTables::Both { point, line } => vec![
                (TableKind::Point, point.as_str()),
                (TableKind::Line, line.as_str()),
            ],
        }
    }
}

/// Database login. The secret never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub secret: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("secret", &self.secret.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn geometry_mode_parses_case_insensitively() {
        assert_eq!("Point".parse::<GeometryMode>(), Ok(GeometryMode::Point));
        assert_eq!("LINE".parse::<GeometryMode>(), Ok(GeometryMode::Line));
        assert_eq!(" both ".parse::<GeometryMode>(), Ok(GeometryMode::Both));
        assert!("polygon".parse::<GeometryMode>().is_err());
    }

    #[test]
    fn point_mode_uses_first_name() {
        let tables = TargetTables::from_names(GeometryMode::Point, &names(&["pts", "lns"])).unwrap();
        assert_eq!(
            tables,
            TargetTables::Point {
                point: "pts".to_string()
            }
        );
    }

    #[test]
    fn line_mode_uses_first_name() {
        let tables = TargetTables::from_names(GeometryMode::Line, &names(&["tracks"])).unwrap();
        assert_eq!(
            tables,
            TargetTables::Line {
                line: "tracks".to_string()
            }
        );
    }

    #[test]
    fn both_mode_requires_two_names() {
        let err = TargetTables::from_names(GeometryMode::Both, &names(&["pts"])).unwrap_err();
        assert!(err.contains("position 1"), "{err}");

        let tables = TargetTables::from_names(GeometryMode::Both, &names(&["pts", "lns"])).unwrap();
        assert_eq!(
            tables.tables(),
            vec![(TableKind::Point, "pts"), (TableKind::Line, "lns")]
        );
        assert_eq!(tables.mode(), GeometryMode::Both);
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(TargetTables::from_names(GeometryMode::Point, &names(&["  "])).is_err());
        assert!(TargetTables::from_names(GeometryMode::Line, &[]).is_err());
    }

    #[test]
    fn both_mode_rejects_identical_names() {
        assert!(TargetTables::from_names(GeometryMode::Both, &names(&["t", "t"])).is_err());
    }

    #[test]
    fn altitude_as_decimal() {
        assert_eq!(Altitude::Integer(12).as_decimal(), Decimal::from(12));
        assert_eq!(
            Altitude::Decimal(Decimal::new(123, 1)).as_decimal().to_string(),
            "12.3"
        );
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let creds = Credentials {
            user: "postgres".to_string(),
            secret: Some("hunter2".to_string()),
        };
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("hunter2"));
    }
}
