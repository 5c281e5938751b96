//! Dashboard widget configuration entity.

use super::EntityId;
use serde::{Deserialize, Serialize};

/// Kind of dashboard panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WidgetKind {
    #[serde(rename = "quicklinks")]
    QuickLinks,
    #[serde(rename = "triumphgoals")]
    Goals,
    #[serde(rename = "knowledgebytes")]
    Snippets,
}

impl WidgetKind {
    /// Kinds in add-widget menu order.
    pub const ALL: [WidgetKind; 3] = [Self::QuickLinks, Self::Goals, Self::Snippets];

    /// Stable storage key; matches the serde spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::QuickLinks => "quicklinks",
            Self::Goals => "triumphgoals",
            Self::Snippets => "knowledgebytes",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    /// Menu label.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::QuickLinks => "Quick Links",
            Self::Goals => "Triumph Goals",
            Self::Snippets => "Knowledge Bytes",
        }
    }
}

/// One panel placed on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub id: EntityId,
    pub kind: WidgetKind,
    pub display_order: i32,
    /// Opaque widget-specific payload.
    pub payload: Option<Vec<u8>>,
}
