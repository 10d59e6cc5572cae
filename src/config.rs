use crate::error::{ExerciseError, Result};
use crate::render::RenderOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Blank densities generated when nothing else is configured
pub const DEFAULT_EVERY_NTH: [usize; 3] = [5, 6, 7];

/// Ordinal form of a number: 1st, 2nd, 3rd, 4th, 11th, 21st, 112th
pub fn ordinal_suffix(num: usize) -> String {
    let suffix = if (11..=13).contains(&(num % 100)) {
        "th"
    } else {
        match num % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    };
    format!("{num}{suffix}")
}

/// Difficulty rank of a variant within its set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn level(self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }
}

/// One blank-density configuration: blank every `every_nth` word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// 1-based position in the configured list, shown as "Version n"
    pub ordinal: usize,
    pub every_nth: usize,
}

impl Variant {
    pub fn new(ordinal: usize, every_nth: usize) -> Result<Self> {
        if every_nth == 0 {
            return Err(ExerciseError::InvalidConfiguration { every_nth });
        }
        Ok(Self { ordinal, every_nth })
    }

    /// Output label, e.g. `every_5th`
    pub fn label(&self) -> String {
        format!("every_{}", ordinal_suffix(self.every_nth))
    }

    /// Human-readable exercise type, e.g. `Every 5th Word`
    pub fn exercise_type(&self) -> String {
        format!("Every {} Word", ordinal_suffix(self.every_nth))
    }
}

/// Ordered, validated list of variants generated for every source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSet {
    variants: Vec<Variant>,
}

impl VariantSet {
    /// Build a set from blank densities in the given order
    ///
    /// Fails on an empty list, a zero density or a repeated density; nothing is
    /// coerced into range.
    pub fn from_every_nth(values: &[usize]) -> Result<Self> {
        if values.is_empty() {
            return Err(ExerciseError::NoVariants);
        }

        let mut seen = HashSet::new();
        let mut variants = Vec::with_capacity(values.len());
        for (idx, &every_nth) in values.iter().enumerate() {
            let variant = Variant::new(idx + 1, every_nth)?;
            if !seen.insert(every_nth) {
                return Err(ExerciseError::DuplicateVariant { every_nth });
            }
            variants.push(variant);
        }

        Ok(Self { variants })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.variants.iter()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Densest variant is easiest, sparsest is hardest
    pub fn difficulty_of(&self, variant: &Variant) -> Difficulty {
        let min = self.variants.iter().map(|v| v.every_nth).min();
        let max = self.variants.iter().map(|v| v.every_nth).max();

        if min == max {
            Difficulty::Medium
        } else if Some(variant.every_nth) == min {
            Difficulty::Easy
        } else if Some(variant.every_nth) == max {
            Difficulty::Hard
        } else {
            Difficulty::Medium
        }
    }
}

impl Default for VariantSet {
    fn default() -> Self {
        let variants = DEFAULT_EVERY_NTH
            .iter()
            .enumerate()
            .map(|(idx, &every_nth)| Variant { ordinal: idx + 1, every_nth })
            .collect();
        Self { variants }
    }
}

impl<'a> IntoIterator for &'a VariantSet {
    type Item = &'a Variant;
    type IntoIter = std::slice::Iter<'a, Variant>;

    fn into_iter(self) -> Self::IntoIter {
        self.variants.iter()
    }
}

/// Everything the batch pipeline needs to turn one source into its exercises
#[derive(Debug, Clone, Default)]
pub struct GenerationConfig {
    pub variants: VariantSet,
    pub render: RenderOptions,
    /// Directory for generated files; next to each source when `None`
    pub out_dir: Option<PathBuf>,
    /// Discovery root; subdirectories below it are mirrored under `out_dir`
    pub source_root: Option<PathBuf>,
    /// Skip sources whose every variant output already exists
    pub skip_existing: bool,
}
