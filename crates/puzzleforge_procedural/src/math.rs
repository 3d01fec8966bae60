//! # Arithmetic Expressions
//!
//! Integer expressions with standard precedence. Division is always exact:
//! every divisor is chosen from the divisors of the running product it
//! divides.

use puzzleforge_core::{tables, Answer, MathContent, PuzzleContent, PuzzleType, QualityMetrics, Solution};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::algorithm::{wrong_kind, Draft, DraftRequest, PuzzleAlgorithm, SolvabilityChecker, Verdict};

/// Largest magnitude the checker accepts at any step.
const MAGNITUDE_LIMIT: i64 = 1_000_000_000_000;

/// Largest right operand for `*` and `/`.
const SMALL_FACTOR: i64 = 12;

const OPERATORS: [char; 4] = ['+', '-', '*', '/'];
const DEFAULT_OPERATORS: [char; 3] = ['+', '-', '*'];

fn operators(allowed: Option<&[String]>) -> Vec<char> {
    let chosen: Vec<char> = allowed
        .map(|list| {
            OPERATORS
                .into_iter()
                .filter(|op| list.iter().any(|s| s.trim() == op.to_string()))
                .collect()
        })
        .unwrap_or_default();
    if chosen.is_empty() {
        DEFAULT_OPERATORS.to_vec()
    } else {
        chosen
    }
}

/// Running evaluation of `total + sign * term`.
struct Builder {
    text: String,
    total: i64,
    sign: i64,
    term: i64,
}

impl Builder {
    fn new(text: String, value: i64) -> Self {
        Self {
            text,
            total: 0,
            sign: 1,
            term: value,
        }
    }

    fn push(&mut self, op: char, range: i64, rng: &mut ChaCha8Rng) {
        let operand = match op {
            '*' => rng.gen_range(2..=SMALL_FACTOR.min(range).max(2)),
            '/' => pick_divisor(self.term, rng),
            _ => rng.gen_range(1..=range),
        };
        match op {
            '+' | '-' => {
                self.total += self.sign * self.term;
                self.sign = if op == '+' { 1 } else { -1 };
                self.term = operand;
            }
            '*' => self.term *= operand,
            _ => self.term /= operand,
        }
        self.text.push_str(&format!(" {op} {operand}"));
    }

    const fn value(&self) -> i64 {
        self.total + self.sign * self.term
    }
}

/// A divisor of `n` in `1..=SMALL_FACTOR`, preferring ones above 1.
fn pick_divisor(n: i64, rng: &mut ChaCha8Rng) -> i64 {
    let divisors: Vec<i64> = (2..=SMALL_FACTOR).filter(|d| n % d == 0).collect();
    if divisors.is_empty() {
        1
    } else {
        divisors[rng.gen_range(0..divisors.len())]
    }
}

/// Arithmetic expression generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct MathAlgorithm;

impl PuzzleAlgorithm for MathAlgorithm {
    fn puzzle_type(&self) -> PuzzleType {
        PuzzleType::Math
    }

    fn draft(&self, request: &DraftRequest<'_>, rng: &mut ChaCha8Rng) -> Draft {
        let difficulty = request.difficulty;
        let ops = request
            .size("operationCount", difficulty.pick(tables::MATH_OPERATIONS))
            .clamp(1, 4);
        let table_range = usize::try_from(difficulty.pick(tables::MATH_NUMBER_RANGES)).unwrap_or(100);
        let range = i64::try_from(request.size("numberRange", table_range))
            .unwrap_or(10_000)
            .clamp(2, 10_000);
        let allowed = operators(request.list("allowedOperations"));
        let grouped = ops >= 2 && request.flag("includeParentheses", false);

        let mut remaining = ops;
        let first = rng.gen_range(1..=range);
        let mut builder = if grouped {
            let mut inner = Builder::new(first.to_string(), first);
            let op = allowed[rng.gen_range(0..allowed.len())];
            inner.push(op, range, rng);
            remaining -= 1;
            Builder::new(format!("({})", inner.text), inner.value())
        } else {
            Builder::new(first.to_string(), first)
        };
        for _ in 0..remaining {
            let op = allowed[rng.gen_range(0..allowed.len())];
            builder.push(op, range, rng);
        }
        let result = builder.value();
        let expression = builder.text;

        let mut steps = Vec::new();
        if grouped {
            steps.push("Evaluate the parenthesized group first".to_string());
        }
        steps.push("Apply multiplication and division from left to right".to_string());
        steps.push("Apply addition and subtraction from left to right".to_string());
        steps.push(format!("Result: {result}"));

        Draft {
            title: "Math Challenge".to_string(),
            description: format!("Evaluate the expression: {expression}"),
            content: PuzzleContent::Math(MathContent {
                expression: expression.clone(),
                operation_count: ops,
                number_range: range,
            }),
            solution: Solution {
                answer: Answer::Number(result),
                explanation: format!("{expression} = {result}"),
                steps,
            },
            hints: vec![
                "Remember the order of operations".to_string(),
                "Multiplication and division come before addition and subtraction".to_string(),
                format!(
                    "The answer is {}",
                    if result % 2 == 0 { "even" } else { "odd" }
                ),
            ],
            metrics: QualityMetrics {
                complexity: ((ops + 1) as f64 / 5.0).min(1.0),
                uniqueness: rng.gen_range(0.5..1.0),
                clarity: 0.9,
                solvability: 1.0,
                engagement_potential: 0.8,
            },
            solvability_score: 1.0,
            validation_score: 0.92,
            estimated_solve_time: 60 + 30 * ops as u32,
        }
    }
}

// =============================================================================
// CHECKER
// =============================================================================

/// Recursive-descent evaluator over integers.
struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
        self.chars.peek().copied()
    }

    fn expect_end(&mut self) -> Result<(), String> {
        match self.peek() {
            None => Ok(()),
            Some(c) => Err(format!("unexpected '{c}'")),
        }
    }

    fn expression(&mut self) -> Result<i64, String> {
        let mut value = self.term()?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.chars.next();
            let rhs = self.term()?;
            let next = if op == '+' {
                value.checked_add(rhs)
            } else {
                value.checked_sub(rhs)
            };
            value = next.ok_or("overflow")?;
            bounded(value)?;
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<i64, String> {
        let mut value = self.factor()?;
        while let Some(op @ ('*' | '/')) = self.peek() {
            self.chars.next();
            let rhs = self.factor()?;
            value = if op == '*' {
                value.checked_mul(rhs).ok_or("overflow")?
            } else {
                if rhs == 0 {
                    return Err("division by zero".to_string());
                }
                if value % rhs != 0 {
                    return Err(format!("{value} / {rhs} is not exact"));
                }
                value / rhs
            };
            bounded(value)?;
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<i64, String> {
        match self.peek() {
            Some('(') => {
                self.chars.next();
                let value = self.expression()?;
                match self.peek() {
                    Some(')') => {
                        self.chars.next();
                        Ok(value)
                    }
                    _ => Err("unbalanced parentheses".to_string()),
                }
            }
            Some('-') => {
                self.chars.next();
                self.factor().map(|v| -v)
            }
            Some(c) if c.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(d) = self.chars.next_if(char::is_ascii_digit) {
                    digits.push(d);
                }
                let value: i64 = digits.parse().map_err(|_| format!("bad number {digits}"))?;
                bounded(value)?;
                Ok(value)
            }
            Some(c) => Err(format!("unexpected '{c}'")),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

fn bounded(value: i64) -> Result<(), String> {
    if value.abs() > MAGNITUDE_LIMIT {
        Err(format!("intermediate value {value} is out of range"))
    } else {
        Ok(())
    }
}

/// Evaluates an expression with exact integer division.
///
/// # Errors
///
/// Returns a description of the first syntax or arithmetic problem.
pub fn evaluate(expression: &str) -> Result<i64, String> {
    let mut parser = Parser::new(expression);
    let value = parser.expression()?;
    parser.expect_end()?;
    Ok(value)
}

/// Re-evaluates the expression and compares it with the answer.
#[derive(Debug, Default, Clone, Copy)]
pub struct MathChecker;

impl SolvabilityChecker for MathChecker {
    fn check(&self, content: &PuzzleContent, answer: &Answer) -> Verdict {
        let PuzzleContent::Math(content) = content else {
            return wrong_kind(PuzzleType::Math);
        };
        let Answer::Number(expected) = answer else {
            return Verdict::Unsolvable("answer is not a number".to_string());
        };
        match evaluate(&content.expression) {
            Ok(value) if value == *expected => Verdict::Solvable,
            Ok(value) => Verdict::Unsolvable(format!("expression evaluates to {value}, not {expected}")),
            Err(reason) => Verdict::Unsolvable(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use puzzleforge_core::{Difficulty, ParamValue, Parameters, PuzzleSeed};

    #[test]
    fn test_evaluate_precedence() {
        assert_eq!(evaluate("2 + 3 * 4"), Ok(14));
        assert_eq!(evaluate("(2 + 3) * 4"), Ok(20));
        assert_eq!(evaluate("20 - 6 / 3 - 1"), Ok(17));
        assert_eq!(evaluate("-4 * 2"), Ok(-8));
    }

    #[test]
    fn test_evaluate_rejects_bad_input() {
        assert!(evaluate("7 / 2").is_err());
        assert!(evaluate("4 / 0").is_err());
        assert!(evaluate("(1 + 2").is_err());
        assert!(evaluate("1 + ").is_err());
        assert!(evaluate("3 3").is_err());
    }

    #[test]
    fn test_generated_expressions_check_out() {
        let mut params = Parameters::new();
        params.insert(
            "allowedOperations".into(),
            ParamValue::List(vec!["+".into(), "-".into(), "*".into(), "/".into()]),
        );
        params.insert("includeParentheses".into(), ParamValue::Bool(true));

        for difficulty in Difficulty::ALL {
            for seed in 0..20 {
                let draft = MathAlgorithm.draft(&DraftRequest::new(difficulty, &params), &mut PuzzleSeed::new(seed).rng());
                let verdict = MathChecker.check(&draft.content, &draft.solution.answer);
                assert!(verdict.is_solvable(), "{difficulty}/{seed}: {verdict:?}");
            }
        }
    }

    #[test]
    fn test_operator_filter() {
        assert_eq!(operators(None), vec!['+', '-', '*']);
        assert_eq!(operators(Some(&["/".to_string(), "^".to_string()])), vec!['/']);
        assert_eq!(operators(Some(&["%".to_string()])), vec!['+', '-', '*']);
    }

    #[test]
    fn test_wrong_answer_rejected() {
        let content = PuzzleContent::Math(MathContent {
            expression: "6 * 7".to_string(),
            operation_count: 1,
            number_range: 10,
        });
        assert!(MathChecker.check(&content, &Answer::Number(42)).is_solvable());
        assert!(!MathChecker.check(&content, &Answer::Number(41)).is_solvable());
    }
}
