use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeType {
    Source,
    Transform,
    Destination,
}

impl NodeType {
    /// Title-cased tag used to derive default node names ("New Transform").
    pub fn title(&self) -> &'static str {
        match self {
            NodeType::Source => "Source",
            NodeType::Transform => "Transform",
            NodeType::Destination => "Destination",
        }
    }

    pub fn default_node_name(&self) -> String {
        format!("New {}", self.title())
    }
}

impl Display for NodeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeType::Source => write!(f, "SOURCE"),
            NodeType::Transform => write!(f, "TRANSFORM"),
            NodeType::Destination => write!(f, "DESTINATION"),
        }
    }
}

impl std::str::FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SOURCE" => Ok(NodeType::Source),
            "TRANSFORM" => Ok(NodeType::Transform),
            "DESTINATION" => Ok(NodeType::Destination),
            other => Err(format!(
                "unknown node type '{other}', expected SOURCE, TRANSFORM or DESTINATION"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Healthy,
    Error,
    Running,
    #[default]
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Active,
    Paused,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_names_follow_type_tag() {
        assert_eq!(NodeType::Transform.default_node_name(), "New Transform");
        assert_eq!(NodeType::Destination.default_node_name(), "New Destination");
    }

    #[test]
    fn wire_format_is_upper_case() {
        let json = serde_json::to_string(&NodeType::Source).expect("serialise");
        assert_eq!(json, "\"SOURCE\"");
        let parsed: NodeType = serde_json::from_str("\"TRANSFORM\"").expect("deserialise");
        assert_eq!(parsed, NodeType::Transform);
    }

    #[test]
    fn parses_cli_spelling() {
        assert_eq!("source".parse::<NodeType>(), Ok(NodeType::Source));
        assert!("sink".parse::<NodeType>().is_err());
    }
}
