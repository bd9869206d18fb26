use serde::{Deserialize, Serialize};

/// One chart request inside a report configuration.
///
/// `kind` is kept as free text: unrecognised kinds are skipped when the
/// report is rendered rather than rejected at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: Option<String>,
    pub y: Option<String>,
    /// Column used to split a line chart into one series per value.
    pub hue: Option<String>,
    /// Value column for pie charts.
    pub values: Option<String>,
    /// Label column for pie charts.
    pub names: Option<String>,
    pub title: Option<String>,
}

impl ChartSpec {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_x(mut self, x: impl Into<String>) -> Self {
        self.x = Some(x.into());
        self
    }

    pub fn with_y(mut self, y: impl Into<String>) -> Self {
        self.y = Some(y.into());
        self
    }

    pub fn with_hue(mut self, hue: impl Into<String>) -> Self {
        self.hue = Some(hue.into());
        self
    }

    pub fn with_values(mut self, values: impl Into<String>, names: Option<String>) -> Self {
        self.values = Some(values.into());
        self.names = names;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
