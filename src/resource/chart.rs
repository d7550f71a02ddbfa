use serde::{Deserialize, Serialize};

use super::{LiveResource, ResourceKind};

/// How the results chart is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Bar,
    Pie,
}

impl ChartKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Pie => "pie",
        }
    }
}

/// Everything a renderer needs to draw the candidates-per-alliance chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSpec {
    pub owner: String,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<u32>,
}

/// Creates live resources for the rendering surface.
pub trait ResourceFactory: Send + Sync {
    fn create_chart(&self, spec: &ChartSpec) -> Box<dyn LiveResource>;
}

/// Factory used when no rendering surface is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedFactory;

impl ResourceFactory for DetachedFactory {
    fn create_chart(&self, spec: &ChartSpec) -> Box<dyn LiveResource> {
        tracing::debug!(
            owner = %spec.owner,
            kind = spec.kind.as_str(),
            series = spec.values.len(),
            "Chart created"
        );
        Box::new(DetachedChart {
            owner: spec.owner.clone(),
            kind: spec.kind,
            disposed: false,
        })
    }
}

/// Chart handle with no backing surface.
#[derive(Debug)]
pub struct DetachedChart {
    owner: String,
    kind: ChartKind,
    disposed: bool,
}

impl LiveResource for DetachedChart {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Chart
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            tracing::debug!(owner = %self.owner, kind = self.kind.as_str(), "Chart destroyed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_kind_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&ChartKind::Pie).unwrap(), "\"pie\"");
        let kind: ChartKind = serde_json::from_str("\"bar\"").unwrap();
        assert_eq!(kind, ChartKind::Bar);
    }
}
