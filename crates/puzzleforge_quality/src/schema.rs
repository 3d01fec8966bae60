//! # Algorithm Schemas
//!
//! Declared parameters and cross-parameter constraints, one schema per
//! puzzle type. These are engine constants.
//!
//! | Type | Algorithm | Numeric parameters |
//! |------|-----------|--------------------|
//! | logic | `LogicPuzzleAlgorithm` | gridSize, constraintCount, variableCount, solvabilityThreshold |
//! | pattern | `PatternAlgorithm` | sequenceLength, patternComplexity, missingCount |
//! | math | `MathExpressionAlgorithm` | operationCount, numberRange |
//! | word | `WordPuzzleAlgorithm` | wordCount, wordLength |
//! | visual | `VisualPatternAlgorithm` | gridSize, complexity |

use puzzleforge_core::{Difficulty, ParamKind, ParamValue, Parameters, PuzzleType};

/// Compile-time default of a parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DefaultValue {
    /// Numeric default.
    Number(f64),
    /// Flag default.
    Bool(bool),
    /// Text default.
    Text(&'static str),
    /// List default.
    List(&'static [&'static str]),
}

impl DefaultValue {
    /// Owned parameter value.
    #[must_use]
    pub fn to_value(self) -> ParamValue {
        match self {
            Self::Number(n) => ParamValue::Number(n),
            Self::Bool(b) => ParamValue::Bool(b),
            Self::Text(s) => ParamValue::Text(s.to_string()),
            Self::List(items) => ParamValue::List(items.iter().map(|s| (*s).to_string()).collect()),
        }
    }

    /// Numeric default, if numeric.
    #[must_use]
    pub const fn as_f64(self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }
}

/// One declared parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlgorithmParameter {
    /// Parameter name, camelCase.
    pub name: &'static str,
    /// Declared kind.
    pub kind: ParamKind,
    /// Value used when absent.
    pub default: DefaultValue,
    /// Inclusive lower bound (numbers only).
    pub min: Option<f64>,
    /// Inclusive upper bound (numbers only).
    pub max: Option<f64>,
    /// What it controls.
    pub description: &'static str,
}

impl AlgorithmParameter {
    const fn number(name: &'static str, default: f64, min: f64, max: f64, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Number,
            default: DefaultValue::Number(default),
            min: Some(min),
            max: Some(max),
            description,
        }
    }

    const fn other(name: &'static str, kind: ParamKind, default: DefaultValue, description: &'static str) -> Self {
        Self {
            name,
            kind,
            default,
            min: None,
            max: None,
            description,
        }
    }

    /// Clamps a number into this parameter's bounds.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        let lower = self.min.unwrap_or(f64::NEG_INFINITY);
        let upper = self.max.unwrap_or(f64::INFINITY);
        value.max(lower).min(upper)
    }

    /// True when the numeric default is a whole number.
    #[must_use]
    pub fn is_integral(&self) -> bool {
        self.default.as_f64().is_some_and(|d| d.fract().abs() < f64::EPSILON)
    }
}

/// Input to a constraint predicate. Absent parameters are already
/// resolved to their defaults.
#[derive(Debug)]
pub struct ConstraintContext<'a> {
    /// Difficulty being validated for.
    pub difficulty: Difficulty,
    /// Puzzle type being validated.
    pub puzzle_type: PuzzleType,
    /// Resolved parameters.
    pub parameters: &'a Parameters,
}

impl ConstraintContext<'_> {
    /// Numeric parameter, or NaN when missing or not a number.
    #[must_use]
    pub fn number(&self, name: &str) -> f64 {
        self.parameters
            .get(name)
            .and_then(ParamValue::as_f64)
            .unwrap_or(f64::NAN)
    }
}

/// A cross-parameter rule.
#[derive(Clone, Copy)]
pub struct AlgorithmConstraint {
    /// Rule name.
    pub name: &'static str,
    /// Holds when the parameters are acceptable.
    pub condition: fn(&ConstraintContext<'_>) -> bool,
    /// Reported when the condition fails.
    pub message: &'static str,
}

impl std::fmt::Debug for AlgorithmConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgorithmConstraint")
            .field("name", &self.name)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Everything declared for one puzzle type.
#[derive(Debug)]
pub struct AlgorithmSchema {
    /// Puzzle type.
    pub puzzle_type: PuzzleType,
    /// Algorithm name, also used as `generationMethod`.
    pub name: &'static str,
    /// Schema version.
    pub version: &'static str,
    /// Declared parameters, in order.
    pub parameters: &'static [AlgorithmParameter],
    /// Cross-parameter rules.
    pub constraints: &'static [AlgorithmConstraint],
}

impl AlgorithmSchema {
    /// Looks up a declared parameter.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&AlgorithmParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// The declared numeric parameters.
    pub fn numeric(&self) -> impl Iterator<Item = &AlgorithmParameter> {
        self.parameters.iter().filter(|p| p.kind == ParamKind::Number)
    }

    /// Every default, as a parameter map.
    #[must_use]
    pub fn defaults(&self) -> Parameters {
        self.parameters
            .iter()
            .map(|p| (p.name.to_string(), p.default.to_value()))
            .collect()
    }

    /// `params` with absent declared parameters filled from defaults.
    #[must_use]
    pub fn resolve(&self, params: &Parameters) -> Parameters {
        let mut resolved = self.defaults();
        resolved.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        resolved
    }
}

// =============================================================================
// SCHEMAS
// =============================================================================

static LOGIC: AlgorithmSchema = AlgorithmSchema {
    puzzle_type: PuzzleType::Logic,
    name: "LogicPuzzleAlgorithm",
    version: "1.0.0",
    parameters: &[
        AlgorithmParameter::number("gridSize", 4.0, 2.0, 8.0, "Size of the logic grid"),
        AlgorithmParameter::number("constraintCount", 5.0, 2.0, 12.0, "Number of constraints to apply"),
        AlgorithmParameter::number("variableCount", 4.0, 2.0, 6.0, "Number of variables in puzzle"),
        AlgorithmParameter::number("solvabilityThreshold", 0.75, 0.5, 1.0, "Minimum solvability score"),
    ],
    constraints: &[
        AlgorithmConstraint {
            name: "constraintGridMatch",
            condition: |c| c.number("constraintCount") <= c.number("gridSize") * 3.0,
            message: "Constraint count should not exceed grid size * 3",
        },
        AlgorithmConstraint {
            name: "gridVariableMatch",
            condition: |c| (c.number("gridSize") - c.number("variableCount")).abs() < f64::EPSILON,
            message: "Grid size should match variable count for logic puzzles",
        },
    ],
};

static PATTERN: AlgorithmSchema = AlgorithmSchema {
    puzzle_type: PuzzleType::Pattern,
    name: "PatternAlgorithm",
    version: "1.0.0",
    parameters: &[
        AlgorithmParameter::number("sequenceLength", 7.0, 5.0, 20.0, "Length of the sequence"),
        AlgorithmParameter::number("patternComplexity", 2.0, 1.0, 4.0, "Pattern complexity level"),
        AlgorithmParameter::number("missingCount", 2.0, 1.0, 5.0, "Number of missing elements to identify"),
        AlgorithmParameter::other(
            "patternTypes",
            ParamKind::Array,
            DefaultValue::List(&["arithmetic", "geometric", "fibonacci"]),
            "Types of patterns to use",
        ),
    ],
    constraints: &[AlgorithmConstraint {
        name: "missingCountLimit",
        condition: |c| c.number("missingCount") < c.number("sequenceLength"),
        message: "Missing count must be less than sequence length",
    }],
};

static MATH: AlgorithmSchema = AlgorithmSchema {
    puzzle_type: PuzzleType::Math,
    name: "MathExpressionAlgorithm",
    version: "1.0.0",
    parameters: &[
        AlgorithmParameter::number("operationCount", 2.0, 1.0, 4.0, "Number of operations in expression"),
        AlgorithmParameter::number("numberRange", 100.0, 10.0, 10_000.0, "Range for random numbers"),
        AlgorithmParameter::other(
            "allowedOperations",
            ParamKind::Array,
            DefaultValue::List(&["+", "-", "*"]),
            "Allowed mathematical operations",
        ),
        AlgorithmParameter::other(
            "includeParentheses",
            ParamKind::Boolean,
            DefaultValue::Bool(false),
            "Whether to include parentheses in expressions",
        ),
    ],
    constraints: &[AlgorithmConstraint {
        name: "operationCountLimit",
        condition: |c| c.number("operationCount") <= 4.0,
        message: "Operation count should not exceed 4",
    }],
};

static WORD: AlgorithmSchema = AlgorithmSchema {
    puzzle_type: PuzzleType::Word,
    name: "WordPuzzleAlgorithm",
    version: "1.0.0",
    parameters: &[
        AlgorithmParameter::number("wordCount", 6.0, 3.0, 12.0, "Number of words in puzzle"),
        AlgorithmParameter::number("wordLength", 7.0, 4.0, 12.0, "Average word length"),
        AlgorithmParameter::other(
            "wordDatabase",
            ParamKind::String,
            DefaultValue::Text("general"),
            "Word database to use",
        ),
        AlgorithmParameter::other(
            "includeClues",
            ParamKind::Boolean,
            DefaultValue::Bool(true),
            "Whether to include word clues",
        ),
    ],
    constraints: &[],
};

static VISUAL: AlgorithmSchema = AlgorithmSchema {
    puzzle_type: PuzzleType::Visual,
    name: "VisualPatternAlgorithm",
    version: "1.0.0",
    parameters: &[
        AlgorithmParameter::number("gridSize", 4.0, 3.0, 6.0, "Size of visual grid"),
        AlgorithmParameter::number("complexity", 3.0, 1.0, 5.0, "Complexity of visual pattern"),
        AlgorithmParameter::other(
            "colorScheme",
            ParamKind::String,
            DefaultValue::Text("blackwhite"),
            "Color scheme for visual puzzle",
        ),
    ],
    constraints: &[],
};

/// The schema for a puzzle type.
#[must_use]
pub fn schema_for(puzzle_type: PuzzleType) -> &'static AlgorithmSchema {
    match puzzle_type {
        PuzzleType::Logic => &LOGIC,
        PuzzleType::Pattern => &PATTERN,
        PuzzleType::Math => &MATH,
        PuzzleType::Word => &WORD,
        PuzzleType::Visual => &VISUAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_has_schema() {
        for t in PuzzleType::ALL {
            let schema = schema_for(t);
            assert_eq!(schema.puzzle_type, t);
            assert_eq!(schema.version, "1.0.0");
            assert!(schema.numeric().count() >= 2);
        }
        assert_eq!(schema_for(PuzzleType::Math).name, "MathExpressionAlgorithm");
    }

    #[test]
    fn test_defaults_satisfy_constraints() {
        for t in PuzzleType::ALL {
            let schema = schema_for(t);
            let resolved = schema.defaults();
            let ctx = ConstraintContext {
                difficulty: Difficulty::Medium,
                puzzle_type: t,
                parameters: &resolved,
            };
            for constraint in schema.constraints {
                assert!((constraint.condition)(&ctx), "{} fails on defaults", constraint.name);
            }
        }
    }

    #[test]
    fn test_resolve_keeps_supplied_values() {
        let mut params = Parameters::new();
        params.insert("gridSize".into(), ParamValue::Number(6.0));
        let resolved = schema_for(PuzzleType::Logic).resolve(&params);
        assert_eq!(resolved["gridSize"], ParamValue::Number(6.0));
        assert_eq!(resolved["constraintCount"], ParamValue::Number(5.0));
    }

    #[test]
    fn test_clamp_and_integral() {
        let schema = schema_for(PuzzleType::Logic);
        let grid = schema.parameter("gridSize").unwrap();
        assert!((grid.clamp(20.0) - 8.0).abs() < f64::EPSILON);
        assert!(grid.is_integral());
        assert!(!schema.parameter("solvabilityThreshold").unwrap().is_integral());
    }
}
