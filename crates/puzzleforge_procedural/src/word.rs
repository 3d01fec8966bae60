//! # Word Scrambles
//!
//! Themed anagram puzzles. Words come from a fixed bank per theme; a word
//! is only eligible when no other word in its bank shares its letters, so
//! every scramble has one reading.

use puzzleforge_core::{tables, Answer, PuzzleContent, PuzzleType, QualityMetrics, Solution, WordContent};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::algorithm::{wrong_kind, Draft, DraftRequest, PuzzleAlgorithm, SolvabilityChecker, Verdict};

const DEFAULT_THEME: &str = "general";
const SHUFFLE_ATTEMPTS: usize = 10;

/// Themes with a word bank.
pub const THEMES: [&str; 3] = ["general", "technology", "nature"];

/// `(word, clue)` pairs for a theme, case-insensitive.
#[must_use]
pub fn bank(theme: &str) -> Option<&'static [(&'static str, &'static str)]> {
    match theme.to_ascii_lowercase().as_str() {
        "general" => Some(GENERAL),
        "technology" => Some(TECHNOLOGY),
        "nature" => Some(NATURE),
        _ => None,
    }
}

fn signature(word: &str) -> Vec<char> {
    let mut letters: Vec<char> = word.to_ascii_uppercase().chars().collect();
    letters.sort_unstable();
    letters
}

/// Bank words sharing the letters of `scramble`.
fn readings<'b>(entries: &'b [(&'static str, &'static str)], scramble: &str) -> Vec<&'b str> {
    let key = signature(scramble);
    entries
        .iter()
        .filter(|(word, _)| signature(word) == key)
        .map(|(word, _)| *word)
        .collect()
}

/// Entries within `spread` letters of `target`, widening until `count`
/// are available or the bank is exhausted.
fn eligible(
    entries: &'static [(&'static str, &'static str)],
    target: usize,
    count: usize,
) -> Vec<(&'static str, &'static str)> {
    let unambiguous: Vec<(&'static str, &'static str)> = entries
        .iter()
        .copied()
        .filter(|(word, _)| readings(entries, word).len() == 1)
        .collect();
    let mut spread = 2;
    loop {
        let within: Vec<_> = unambiguous
            .iter()
            .copied()
            .filter(|(word, _)| word.len().abs_diff(target) <= spread)
            .collect();
        if within.len() >= count || within.len() == unambiguous.len() {
            return within;
        }
        spread += 1;
    }
}

fn scramble(word: &str, rng: &mut ChaCha8Rng) -> String {
    let mut letters: Vec<char> = word.chars().collect();
    for _ in 0..SHUFFLE_ATTEMPTS {
        letters.shuffle(rng);
        let candidate: String = letters.iter().collect();
        if candidate != word {
            return candidate;
        }
    }
    letters.rotate_left(1);
    letters.into_iter().collect()
}

/// Themed word scramble generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct WordAlgorithm;

impl PuzzleAlgorithm for WordAlgorithm {
    fn puzzle_type(&self) -> PuzzleType {
        PuzzleType::Word
    }

    fn draft(&self, request: &DraftRequest<'_>, rng: &mut ChaCha8Rng) -> Draft {
        let difficulty = request.difficulty;
        let requested = request
            .size("wordCount", difficulty.pick(tables::WORD_COUNTS))
            .clamp(3, 12);
        let target = request
            .size("wordLength", difficulty.pick(tables::WORD_LENGTHS))
            .clamp(4, 12);
        let theme = request
            .text("wordDatabase")
            .and_then(|t| THEMES.into_iter().find(|known| known.eq_ignore_ascii_case(t)))
            .unwrap_or(DEFAULT_THEME);
        let with_clues = request.flag("includeClues", true);

        let entries = bank(theme).unwrap_or(GENERAL);
        let pool = eligible(entries, target, requested);
        let chosen: Vec<(&str, &str)> = pool.choose_multiple(rng, requested).copied().collect();
        let word_count = chosen.len();

        let words: Vec<String> = chosen.iter().map(|(w, _)| (*w).to_string()).collect();
        let scrambles: Vec<String> = words.iter().map(|w| scramble(w, rng)).collect();
        let clues: Vec<String> = if with_clues {
            chosen.iter().map(|(_, c)| (*c).to_string()).collect()
        } else {
            Vec::new()
        };

        let mut hints = vec![format!("Every word relates to {theme}")];
        if let Some(first) = words.first() {
            hints.push(format!("The first word starts with {}", &first[..1]));
        }
        if !with_clues {
            hints.push("Longer scrambles hide longer words".to_string());
        }

        let steps = scrambles
            .iter()
            .zip(&words)
            .map(|(s, w)| format!("{s} unscrambles to {w}"))
            .collect();

        Draft {
            title: format!("Word Scramble: {}", capitalize(theme)),
            description: format!("Unscramble the {word_count} {theme} words."),
            content: PuzzleContent::Word(WordContent {
                scrambles,
                clues,
                theme: theme.to_string(),
                word_count,
            }),
            solution: Solution {
                answer: Answer::Words(words),
                explanation: "Rearrange the letters of each scramble to form a word from the theme".to_string(),
                steps,
            },
            hints,
            metrics: QualityMetrics {
                complexity: ((word_count + 2) as f64 / 14.0).min(1.0),
                uniqueness: rng.gen_range(0.6..1.0),
                clarity: 0.85,
                solvability: 0.9,
                engagement_potential: 0.9,
            },
            solvability_score: 0.9,
            validation_score: 0.85,
            estimated_solve_time: 180 + 20 * word_count as u32,
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars
        .next()
        .map(|c| c.to_ascii_uppercase().to_string() + chars.as_str())
        .unwrap_or_default()
}

// =============================================================================
// CHECKER
// =============================================================================

/// Resolves every scramble against the theme's bank.
#[derive(Debug, Default, Clone, Copy)]
pub struct WordChecker;

impl SolvabilityChecker for WordChecker {
    fn check(&self, content: &PuzzleContent, answer: &Answer) -> Verdict {
        let PuzzleContent::Word(content) = content else {
            return wrong_kind(PuzzleType::Word);
        };
        let Answer::Words(words) = answer else {
            return Verdict::Unsolvable("answer is not a word list".to_string());
        };
        let Some(entries) = bank(&content.theme) else {
            return Verdict::Unsolvable(format!("unknown theme {}", content.theme));
        };
        if content.scrambles.is_empty() || content.scrambles.len() != words.len() {
            return Verdict::Unsolvable("scrambles do not match the answer".to_string());
        }

        for (scrambled, word) in content.scrambles.iter().zip(words) {
            if scrambled.eq_ignore_ascii_case(word) {
                return Verdict::Unsolvable(format!("{word} is not scrambled"));
            }
            match readings(entries, scrambled).as_slice() {
                [only] if only.eq_ignore_ascii_case(word) => {}
                [only] => return Verdict::Unsolvable(format!("{scrambled} reads as {only}, not {word}")),
                [] => return Verdict::Unsolvable(format!("{scrambled} has no reading")),
                _ => return Verdict::Unsolvable(format!("{scrambled} has several readings")),
            }
        }
        Verdict::Solvable
    }
}

// =============================================================================
// WORD BANKS
// =============================================================================

const GENERAL: &[(&str, &str)] = &[
    ("BOOK", "Something you read"),
    ("LAMP", "Gives light in a room"),
    ("DOOR", "You open it to enter"),
    ("BREAD", "Baked from flour"),
    ("CHAIR", "Something to sit on"),
    ("CLOCK", "Tells the time"),
    ("HOUSE", "A place to live"),
    ("MUSIC", "Organized sound"),
    ("PAPER", "Made from wood pulp"),
    ("WINDOW", "A pane of glass in a wall"),
    ("PENCIL", "A writing tool with graphite"),
    ("GARDEN", "Where flowers are grown"),
    ("BRIDGE", "Crosses over a river"),
    ("CASTLE", "A fortified royal home"),
    ("MARKET", "Where goods are sold"),
    ("KITCHEN", "Where meals are cooked"),
    ("LIBRARY", "A place full of books"),
    ("BICYCLE", "Two wheels and pedals"),
    ("LANTERN", "A portable light"),
    ("BLANKET", "Keeps you warm in bed"),
    ("UMBRELLA", "Keeps you dry in the rain"),
    ("HOSPITAL", "Where the sick are treated"),
    ("AIRPLANE", "Flies passengers across the sky"),
    ("SANDWICH", "Food between two slices of bread"),
    ("CALENDAR", "Shows days and months"),
    ("BIRTHDAY", "Celebrated once a year"),
    ("SUITCASE", "Holds clothes for travel"),
    ("NEWSPAPER", "Printed daily news"),
    ("CHOCOLATE", "A sweet made from cocoa"),
    ("FURNITURE", "Tables, chairs and beds"),
    ("TELEPHONE", "Rings when someone calls"),
    ("ADVENTURE", "An exciting journey"),
    ("ORCHESTRA", "Musicians playing together"),
    ("BREAKFAST", "The first meal of the day"),
    ("DICTIONARY", "Lists words and their meanings"),
    ("RESTAURANT", "Where you order a meal"),
    ("BASKETBALL", "A game played with hoops"),
    ("HELICOPTER", "Aircraft with rotating blades"),
    ("PHOTOGRAPH", "A picture taken with a camera"),
    ("TOOTHBRUSH", "Cleans your teeth"),
    ("WATERMELON", "Large green fruit with red flesh"),
    ("LIGHTHOUSE", "Guides ships at night"),
    ("PLAYGROUND", "Where children play outside"),
    ("GRANDFATHER", "Your parent's father"),
    ("ENCYCLOPEDIA", "Reference work covering every subject"),
    ("CHAMPIONSHIP", "A contest to find the best"),
    ("CONVERSATION", "People talking together"),
    ("REFRIGERATOR", "Keeps food cold"),
];

const TECHNOLOGY: &[(&str, &str)] = &[
    ("CODE", "Instructions for a computer"),
    ("DATA", "Facts stored for processing"),
    ("CHIP", "A tiny integrated circuit"),
    ("MOUSE", "A pointing device"),
    ("PIXEL", "Smallest dot on a screen"),
    ("ROBOT", "A programmable machine"),
    ("CLOUD", "Remote servers on the internet"),
    ("LASER", "A focused beam of light"),
    ("SERVER", "Hosts websites and services"),
    ("SCREEN", "Displays images"),
    ("BINARY", "Zeros and ones"),
    ("ROUTER", "Directs network traffic"),
    ("KERNEL", "Core of an operating system"),
    ("GADGET", "A small handy device"),
    ("BATTERY", "Stores electrical energy"),
    ("NETWORK", "Connected computers"),
    ("DIGITAL", "Based on numbers"),
    ("COMPILER", "Translates source code"),
    ("KEYBOARD", "Used for typing"),
    ("INTERNET", "A global network of networks"),
    ("SOFTWARE", "Programs that run on hardware"),
    ("HARDWARE", "Physical parts of a computer"),
    ("DATABASE", "Organized collection of data"),
    ("DOWNLOAD", "Copy from the internet"),
    ("FIREWALL", "Blocks unwanted traffic"),
    ("ALGORITHM", "A step-by-step procedure"),
    ("PROCESSOR", "Executes instructions"),
    ("BANDWIDTH", "Data transfer capacity"),
    ("BLUETOOTH", "Short-range wireless link"),
    ("INTERFACE", "Where two systems meet"),
    ("MICROCHIP", "A small integrated circuit"),
    ("SMARTPHONE", "A pocket-sized computer with a phone"),
    ("CALCULATOR", "Does arithmetic"),
    ("TRANSISTOR", "Switches electronic signals"),
    ("ENCRYPTION", "Scrambles data for privacy"),
    ("SIMULATION", "A computer model of reality"),
    ("TELEVISION", "A broadcast screen"),
    ("AUTOMATION", "Machines doing work unaided"),
    ("SPREADSHEET", "A grid of cells for calculations"),
    ("APPLICATION", "A program for users"),
    ("ELECTRONICS", "Circuits and components"),
    ("PROGRAMMING", "Writing instructions for computers"),
    ("MOTHERBOARD", "The main circuit board"),
    ("DEVELOPMENT", "Building software step by step"),
    ("TRANSMITTER", "Sends radio signals"),
    ("DISTRIBUTION", "Spreading software to users"),
    ("OPTIMIZATION", "Making code run faster"),
    ("CRYPTOGRAPHY", "The science of secret codes"),
];

const NATURE: &[(&str, &str)] = &[
    ("TREE", "A tall woody plant"),
    ("LEAF", "Green part of a plant"),
    ("RAIN", "Water falling from clouds"),
    ("WIND", "Moving air"),
    ("MOSS", "A soft green plant"),
    ("RIVER", "A flowing body of water"),
    ("OCEAN", "A vast body of salt water"),
    ("STONE", "A small piece of rock"),
    ("FLOWER", "Blooms in spring"),
    ("FOREST", "Many trees together"),
    ("DESERT", "Dry sandy land"),
    ("ISLAND", "Land surrounded by water"),
    ("VALLEY", "Low land between hills"),
    ("MEADOW", "A grassy field"),
    ("POLLEN", "Powder carried by bees"),
    ("CANYON", "A deep gorge"),
    ("TUNDRA", "A frozen treeless plain"),
    ("THUNDER", "Sound after lightning"),
    ("RAINBOW", "An arc of colors after rain"),
    ("VOLCANO", "A mountain that erupts"),
    ("GLACIER", "A slow river of ice"),
    ("HABITAT", "Natural home of a species"),
    ("MOUNTAIN", "A very high hill"),
    ("SUNSHINE", "Light from the sun"),
    ("WILDLIFE", "Animals in their habitat"),
    ("SQUIRREL", "A tree-dwelling rodent"),
    ("HEDGEHOG", "A small spiny mammal"),
    ("SEEDLING", "A young plant"),
    ("WATERFALL", "Water dropping over a cliff"),
    ("BUTTERFLY", "Insect with colorful wings"),
    ("HURRICANE", "A powerful tropical storm"),
    ("LANDSCAPE", "A view of the countryside"),
    ("LIGHTNING", "A flash in a storm"),
    ("SNOWFLAKE", "An ice crystal falling from the sky"),
    ("EVERGREEN", "Keeps its leaves all year"),
    ("ECOSYSTEM", "A community of living things"),
    ("EARTHQUAKE", "Shaking of the ground"),
    ("WILDFLOWER", "Grows without cultivation"),
    ("RAINFOREST", "Dense tropical woodland"),
    ("ATMOSPHERE", "Layer of gases around Earth"),
    ("VEGETATION", "Plant life"),
    ("GRASSHOPPER", "A jumping insect"),
    ("CATERPILLAR", "Becomes a butterfly"),
    ("ENVIRONMENT", "Surroundings of living things"),
    ("HIBERNATION", "A long winter sleep"),
    ("THUNDERSTORM", "A storm with lightning"),
    ("BIODIVERSITY", "Variety of life"),
    ("CONSERVATION", "Protecting nature"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use puzzleforge_core::{Difficulty, ParamValue, Parameters, PuzzleSeed};

    #[test]
    fn test_banks_are_uppercase_and_sized() {
        for theme in THEMES {
            let entries = bank(theme).unwrap();
            assert!(entries.len() >= 40, "{theme}");
            assert!(entries
                .iter()
                .all(|(w, _)| w.len() >= 4 && w.len() <= 12 && w.chars().all(|c| c.is_ascii_uppercase())));
        }
        assert!(bank("Nature").is_some());
        assert!(bank("cooking").is_none());
    }

    #[test]
    fn test_drafts_are_solvable() {
        for difficulty in Difficulty::ALL {
            for seed in 0..10 {
                let params = Parameters::new();
                let draft = WordAlgorithm.draft(&DraftRequest::new(difficulty, &params), &mut PuzzleSeed::new(seed).rng());
                let verdict = WordChecker.check(&draft.content, &draft.solution.answer);
                assert!(verdict.is_solvable(), "{difficulty}/{seed}: {verdict:?}");

                let PuzzleContent::Word(content) = &draft.content else {
                    panic!("not a word puzzle");
                };
                assert_eq!(content.word_count, difficulty.pick(tables::WORD_COUNTS));
                assert_eq!(content.clues.len(), content.word_count);
            }
        }
    }

    #[test]
    fn test_theme_and_clue_parameters() {
        let mut params = Parameters::new();
        params.insert("wordDatabase".into(), ParamValue::from("Technology"));
        params.insert("includeClues".into(), ParamValue::Bool(false));
        let draft = WordAlgorithm.draft(&DraftRequest::new(Difficulty::Easy, &params), &mut PuzzleSeed::new(3).rng());

        let PuzzleContent::Word(content) = &draft.content else {
            panic!("not a word puzzle");
        };
        assert_eq!(content.theme, "technology");
        assert!(content.clues.is_empty());
        assert_eq!(draft.title, "Word Scramble: Technology");
    }

    #[test]
    fn test_ambiguous_scramble_rejected() {
        let content = PuzzleContent::Word(WordContent {
            scrambles: vec!["DOOR".to_string()],
            clues: Vec::new(),
            theme: "general".to_string(),
            word_count: 1,
        });
        let verdict = WordChecker.check(&content, &Answer::Words(vec!["DOOR".to_string()]));
        assert!(!verdict.is_solvable());

        let content = PuzzleContent::Word(WordContent {
            scrambles: vec!["ORDO".to_string()],
            clues: Vec::new(),
            theme: "general".to_string(),
            word_count: 1,
        });
        assert!(WordChecker.check(&content, &Answer::Words(vec!["DOOR".to_string()])).is_solvable());
        assert!(!WordChecker.check(&content, &Answer::Words(vec!["BOOK".to_string()])).is_solvable());
    }

    #[test]
    fn test_scramble_differs() {
        let mut rng = PuzzleSeed::new(1).rng();
        for (word, _) in GENERAL {
            assert_ne!(&scramble(word, &mut rng), word);
        }
    }
}
