// Output naming for generated exercises and the guard that keeps them from
// being picked up again as lesson sources on the next run.

use crate::config::{ordinal_suffix, Variant, VariantSet};
use std::path::{Path, PathBuf};

/// Infix between the source stem and the variant label
pub const EXERCISE_INFIX: &str = "_exercise_";

/// Stable source name: the file stem of the lesson
///
/// Stems that are not valid UTF-8 are converted lossily, so distinct stems
/// keep distinct names as far as the replacement character allows.
pub fn source_name(source_path: &Path) -> String {
    source_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}

/// File name of one generated variant, e.g. `les1_exercise_every_5th.html`
pub fn exercise_file_name(source_name: &str, variant: &Variant) -> String {
    format!("{source_name}{EXERCISE_INFIX}{}.html", variant.label())
}

/// Output directory for one source when an output root is configured
///
/// Sources below `source_root` keep their subdirectory under `out_dir`, so
/// `a/les1.html` and `b/les1.html` write to `out/a/` and `out/b/`. Sources
/// outside the root land directly in `out_dir`.
pub fn mirrored_out_dir(source_path: &Path, out_dir: Option<&Path>, source_root: Option<&Path>) -> Option<PathBuf> {
    let out_dir = out_dir?;
    let relative_parent = source_root.and_then(|root| source_path.parent()?.strip_prefix(root).ok());

    Some(match relative_parent {
        Some(relative) => out_dir.join(relative),
        None => out_dir.to_path_buf(),
    })
}

/// Output path for one variant of a source
///
/// Lands next to the source unless an output directory is given.
pub fn generate_exercise_path(source_path: &Path, variant: &Variant, out_dir: Option<&Path>) -> PathBuf {
    let file_name = exercise_file_name(&source_name(source_path), variant);
    match out_dir {
        Some(dir) => dir.join(file_name),
        None => source_path.with_file_name(file_name),
    }
}

/// All output paths of a source, in variant order
pub fn generate_exercise_paths(source_path: &Path, variants: &VariantSet, out_dir: Option<&Path>) -> Vec<PathBuf> {
    variants
        .iter()
        .map(|variant| generate_exercise_path(source_path, variant, out_dir))
        .collect()
}

/// Check whether every variant output of a source already exists
pub fn exercise_outputs_exist(source_path: &Path, variants: &VariantSet, out_dir: Option<&Path>) -> bool {
    generate_exercise_paths(source_path, variants, out_dir)
        .iter()
        .all(|path| path.exists())
}

/// Recognise a generated exercise file by name
///
/// Matches `<stem>_exercise_every_<N><suffix>.html` for any N with its proper
/// ordinal suffix, independent of the densities configured for this run.
pub fn is_generated_exercise(path: &Path) -> bool {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let Some(stem) = file_name.strip_suffix(".html") else {
        return false;
    };
    let Some((_, ordinal)) = stem.rsplit_once("_exercise_every_") else {
        return false;
    };

    let digits_len = ordinal.chars().take_while(char::is_ascii_digit).count();
    if digits_len == 0 {
        return false;
    }
    match ordinal[..digits_len].parse::<usize>() {
        Ok(num) => ordinal_suffix(num) == ordinal,
        Err(_) => false,
    }
}
