use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Condition {
    GreaterThan,
    GreaterOrEqual,
    Equal,
    LessThan,
    LessOrEqual,
}

impl Condition {
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            ">" => Some(Self::GreaterThan),
            ">=" => Some(Self::GreaterOrEqual),
            "==" => Some(Self::Equal),
            "<" => Some(Self::LessThan),
            "<=" => Some(Self::LessOrEqual),
            _ => None,
        }
    }

    pub fn evaluate(&self, value: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThan => value > threshold,
            Self::GreaterOrEqual => value >= threshold,
            Self::Equal => value == threshold,
            Self::LessThan => value < threshold,
            Self::LessOrEqual => value <= threshold,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::GreaterOrEqual => ">=",
            Self::Equal => "==",
            Self::LessThan => "<",
            Self::LessOrEqual => "<=",
        }
    }
}

/// One `OP bound` clause. The bound keeps its literal text so fault
/// messages echo the threshold exactly as configured.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    pub condition: Condition,
    pub threshold: f64,
    pub literal: String,
}

impl Bound {
    pub fn matches(&self, value: f64) -> bool {
        self.condition.evaluate(value, self.threshold)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.condition.as_str(), self.literal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Warning,
    Error,
    Critical,
    Clear,
}

impl Level {
    pub fn parse(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "critical" => Some(Self::Critical),
            "clear" => Some(Self::Clear),
            _ => None,
        }
    }
}
