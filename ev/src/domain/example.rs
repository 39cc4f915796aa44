//! Scripted examples that enqueue a fixed sequence of primitives

use serde::{Deserialize, Serialize};

use super::item::TaskKind;

/// A canned scenario demonstrating one ordering rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Example {
    MacroThenMicro,
    MicroThenMacro,
    ThreeMicro,
}

impl Example {
    /// All examples in menu order
    pub const ALL: [Example; 3] = [Self::MacroThenMicro, Self::MicroThenMacro, Self::ThreeMicro];

    /// Primitives issued by this example, in order
    pub fn steps(&self) -> &'static [TaskKind] {
        match self {
            Self::MacroThenMicro => &[TaskKind::Macro, TaskKind::Micro],
            Self::MicroThenMacro => &[TaskKind::Micro, TaskKind::Macro],
            Self::ThreeMicro => &[TaskKind::Micro, TaskKind::Micro, TaskKind::Micro],
        }
    }

    /// Note appended to the timeline after the primitives are scheduled
    pub fn note(&self) -> &'static str {
        match self {
            Self::MacroThenMicro => "Example: scheduled macro then micro; micro will drain before next tick",
            Self::MicroThenMacro => "Example: scheduled micro then macro",
            Self::ThreeMicro => "Example: 3 microtasks scheduled",
        }
    }

    /// Short menu title
    pub fn title(&self) -> &'static str {
        match self {
            Self::MacroThenMicro => "macro then micro",
            Self::MicroThenMacro => "micro then macro",
            Self::ThreeMicro => "3 microtasks",
        }
    }
}

impl std::fmt::Display for Example {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MacroThenMicro => write!(f, "macro-then-micro"),
            Self::MicroThenMacro => write!(f, "micro-then-macro"),
            Self::ThreeMicro => write!(f, "three-micro"),
        }
    }
}

impl std::str::FromStr for Example {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "macro-then-micro" => Ok(Self::MacroThenMicro),
            "micro-then-macro" => Ok(Self::MicroThenMacro),
            "three-micro" | "3-micro" => Ok(Self::ThreeMicro),
            _ => Err(format!(
                "Unknown example: {}. Use: macro-then-micro, micro-then-macro, or three-micro",
                s
            )),
        }
    }
}
