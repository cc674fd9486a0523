//! Partitions a dataset into per-year economy groups.
//!
//! For an output `dir/<base>.json` the writer produces
//! `dir/<base>-<year>-g<N>.json` shard files and a `dir/<base>.index.json`
//! index. Shards left behind by an earlier run are removed first, so the
//! directory only ever holds the shards listed in the current index.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::energy::prep::error::Result;
use crate::energy::prep::io::json::write_json;
use crate::energy::prep::model::{Dataset, Profile, ShardGroup, ShardIndex};

pub const DEFAULT_GROUP_SIZE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardOptions {
    pub group_size: usize,
}

impl Default for ShardOptions {
    fn default() -> Self {
        Self {
            group_size: DEFAULT_GROUP_SIZE,
        }
    }
}

#[derive(Serialize)]
struct Shard<'a> {
    year: i32,
    scenario: &'a str,
    profiles: Vec<&'a Profile>,
}

fn base_name(output: &Path) -> String {
    output
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn output_dir(output: &Path) -> PathBuf {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Path of the shard index that belongs to an output file.
pub fn index_path(output: &Path) -> PathBuf {
    output_dir(output).join(format!("{}.index.json", base_name(output)))
}

pub fn shard_file_name(base: &str, year: i32, group: usize) -> String {
    format!("{base}-{year}-g{group}.json")
}

/// Whether `file_name` is a shard written for `base`.
pub fn is_shard_file(file_name: &str, base: &str) -> bool {
    let Some(rest) = file_name
        .strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('-'))
        .and_then(|rest| rest.strip_suffix(".json"))
    else {
        return false;
    };
    let Some((year, group)) = rest.split_once("-g") else {
        return false;
    };
    let all_digits = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
    all_digits(year) && all_digits(group)
}

/// Shard files of `output` currently on disk, sorted by path.
pub fn existing_shards(output: &Path) -> Result<Vec<PathBuf>> {
    let dir = output_dir(output);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let base = base_name(output);
    let mut shards = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        if is_shard_file(&file_name.to_string_lossy(), &base) && entry.path().is_file() {
            shards.push(entry.path());
        }
    }
    shards.sort();
    Ok(shards)
}

/// Splits profiles, ordered by economy code, into consecutive groups.
pub fn plan_groups(profiles: &[Profile], group_size: usize) -> Vec<Vec<&Profile>> {
    let mut ordered: Vec<&Profile> = profiles.iter().collect();
    ordered.sort_by(|left, right| left.code().cmp(right.code()));
    ordered
        .chunks(group_size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Writes the shard files and index of a dataset, replacing any shards of
/// a previous run.
#[instrument(
    level = "info",
    skip_all,
    fields(output = %output.display(), group_size = options.group_size)
)]
pub fn write_shards(dataset: &Dataset, output: &Path, options: &ShardOptions) -> Result<ShardIndex> {
    let stale = existing_shards(output)?;
    for path in &stale {
        fs::remove_file(path)?;
    }
    debug!(removed = stale.len(), "removed stale shards");

    let dir = output_dir(output);
    let base = base_name(output);
    let mut index = ShardIndex {
        years: dataset.years.clone(),
        default_year: dataset.default_year,
        scenario: dataset.scenario.clone(),
        year_groups: Default::default(),
    };
    let mut written = 0usize;
    for (year, year_data) in &dataset.datasets {
        let mut groups = Vec::new();
        for (position, members) in plan_groups(&year_data.profiles, options.group_size)
            .into_iter()
            .enumerate()
        {
            let number = position + 1;
            let file = shard_file_name(&base, *year, number);
            let economies = members
                .iter()
                .map(|profile| profile.code().to_string())
                .collect();
            let shard = Shard {
                year: *year,
                scenario: &year_data.scenario,
                profiles: members,
            };
            write_json(&dir.join(&file), &shard)?;
            written += 1;
            groups.push(ShardGroup {
                id: format!("g{number}"),
                file,
                economies,
            });
        }
        index.year_groups.insert(*year, groups);
    }

    write_json(&index_path(output), &index)?;
    info!(shards = written, "wrote shard files and index");
    Ok(index)
}

/// Removes a dataset file together with its index and shards. Returns the
/// number of files deleted.
pub fn remove_dataset_outputs(output: &Path) -> Result<usize> {
    let mut removed = 0usize;
    for path in [output.to_path_buf(), index_path(output)] {
        if path.is_file() {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    for shard in existing_shards(output)? {
        fs::remove_file(&shard)?;
        removed += 1;
    }
    Ok(removed)
}
