/*!
 * Reassembly of translated chunks into output files.
 *
 * Translated chunks are concatenated in index order and then fitted back
 * into the structure of the original file: subtitle cues keep their
 * numbering and timing, CSV files keep their header row and JSON is
 * re-indented when it still parses.
 */

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::chunking::FileRecord;
use crate::file_utils::{FileManager, FileType};

/// Suffix inserted before the extension of output files
pub const TRANSLATED_SUFFIX: &str = "_translated";

/// Name of the artifact holding several files
pub const BUNDLE_FILE_NAME: &str = "translated_files.txt";

/// A finished output file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadArtifact {
    pub content: String,
    pub file_name: String,
    pub mime_type: String,
}

/// Concatenate chunks in index order, translations taking precedence
pub fn combine(record: &FileRecord) -> String {
    let mut chunks: Vec<_> = record.chunks.iter().collect();
    chunks.sort_by_key(|c| c.index);
    chunks.iter().map(|c| c.output_text()).collect()
}

/// Fit `combined` back into the structure of the original file
pub fn format(record: &FileRecord, combined: &str) -> DownloadArtifact {
    let content = match record.file_type {
        FileType::Srt => format_srt(combined, &record.content),
        FileType::Vtt => format_vtt(combined, &record.content),
        FileType::Csv => format_csv(combined, &record.content),
        FileType::Json => format_json(combined, &record.content),
        FileType::Text => combined.to_string(),
    };

    let file_name = generate_file_name(&record.name);
    let mime_type = FileManager::mime_type(&file_name).to_string();

    DownloadArtifact {
        content,
        file_name,
        mime_type,
    }
}

/// `combine` followed by `format`
pub fn render(record: &FileRecord) -> DownloadArtifact {
    format(record, &combine(record))
}

/// Insert `_translated` before the last extension
pub fn generate_file_name(name: &str) -> String {
    match name.rfind('.') {
        Some(pos) => format!("{}{}{}", &name[..pos], TRANSLATED_SUFFIX, &name[pos..]),
        None => format!("{}{}", name, TRANSLATED_SUFFIX),
    }
}

/// Merge artifacts into one download
///
/// A single artifact is returned unchanged; several are concatenated into
/// `translated_files.txt` with a `=== name ===` header per file.
pub fn bundle(artifacts: &[DownloadArtifact]) -> Option<DownloadArtifact> {
    match artifacts {
        [] => None,
        [single] => Some(single.clone()),
        many => {
            let content = many
                .iter()
                .map(|a| format!("=== {} ===\n{}\n\n", a.file_name, a.content))
                .collect();

            Some(DownloadArtifact {
                content,
                file_name: BUNDLE_FILE_NAME.to_string(),
                mime_type: "text/plain".to_string(),
            })
        }
    }
}

/// Lines without trailing carriage returns
fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').map(|l| l.trim_end_matches('\r')).collect()
}

/// Groups of consecutive non-blank lines
fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in split_lines(text) {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }

    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn is_cue_number(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.chars().all(|c| c.is_ascii_digit())
}

fn is_timing(line: &str) -> bool {
    line.contains("-->")
}

/// One SubRip cue of the original file
struct SrtCue<'a> {
    number: &'a str,
    timing: &'a str,
    text: Vec<&'a str>,
}

fn parse_srt_cues(content: &str) -> Vec<SrtCue<'_>> {
    let lines = split_lines(content);
    let mut cues = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if is_cue_number(lines[i]) && i + 1 < lines.len() && is_timing(lines[i + 1]) {
            let number = lines[i].trim();
            let timing = lines[i + 1];
            i += 2;

            let mut text = Vec::new();
            while i < lines.len() && !lines[i].trim().is_empty() {
                text.push(lines[i]);
                i += 1;
            }

            cues.push(SrtCue { number, timing, text });
        }
        i += 1;
    }

    cues
}

/// Cue text blocks of a translated subtitle file, structural lines removed
fn translated_text_blocks(translated: &str) -> Vec<String> {
    split_blocks(translated)
        .into_iter()
        .map(|block| {
            block
                .into_iter()
                .filter(|line| !is_cue_number(line) && !is_timing(line))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .filter(|text| !text.trim().is_empty())
        .collect()
}

fn format_srt(translated: &str, original: &str) -> String {
    let cues = parse_srt_cues(original);
    if cues.is_empty() {
        debug!("No SubRip cues found, keeping translation as is");
        return translated.to_string();
    }

    let blocks = translated_text_blocks(translated);
    let mut used: Option<usize> = None;
    let mut formatted: Vec<String> = Vec::new();

    for (i, cue) in cues.iter().enumerate() {
        formatted.push(cue.number.to_string());
        formatted.push(cue.timing.to_string());

        // relative position of this cue mapped onto the translated blocks
        let slot = i * blocks.len() / cues.len();
        let fresh = blocks.get(slot).filter(|_| used.is_none_or(|u| slot > u));

        match fresh {
            Some(block) => {
                formatted.push(block.clone());
                used = Some(slot);
            }
            None => formatted.extend(cue.text.iter().map(|l| l.to_string())),
        }

        formatted.push(String::new());
    }

    formatted.join("\n")
}

/// Text lines of a translated WebVTT file, header and comment blocks removed
fn translated_vtt_lines(translated: &str) -> Vec<&str> {
    let blocks: Vec<Vec<&str>> = split_blocks(translated)
        .into_iter()
        .filter(|block| {
            let head = block[0].trim_start();
            !(head.starts_with("WEBVTT") || head.starts_with("NOTE") || head.starts_with("STYLE"))
        })
        .collect();

    // when timings survived translation, only the lines after them are cue text
    let has_timings = blocks.iter().any(|block| block.iter().any(|l| is_timing(l)));

    blocks
        .into_iter()
        .flat_map(|block| {
            let timing_pos = block.iter().position(|l| is_timing(l));
            let lines: Vec<&str> = match (has_timings, timing_pos) {
                (true, Some(pos)) => block[pos + 1..].to_vec(),
                (true, None) => Vec::new(),
                (false, _) => block,
            };
            lines.into_iter().filter(|l| !is_cue_number(l))
        })
        .collect()
}

fn format_vtt(translated: &str, original: &str) -> String {
    let mut translated_lines = translated_vtt_lines(translated).into_iter();

    let mut formatted: Vec<String> = vec!["WEBVTT".to_string(), String::new()];

    for block in split_blocks(original) {
        let head = block[0].trim_start();

        if head.starts_with("NOTE") || head.starts_with("STYLE") {
            formatted.extend(block.iter().map(|l| l.to_string()));
            formatted.push(String::new());
            continue;
        }

        let Some(timing_pos) = block.iter().position(|l| is_timing(l)) else {
            continue;
        };

        formatted.extend(block[..=timing_pos].iter().map(|l| l.to_string()));
        match translated_lines.next() {
            Some(line) => formatted.push(line.to_string()),
            None => formatted.extend(block[timing_pos + 1..].iter().map(|l| l.to_string())),
        }
        formatted.push(String::new());
    }

    formatted.join("\n")
}

fn format_csv(translated: &str, original: &str) -> String {
    let original_lines = split_lines(original);
    let translated_lines = split_lines(translated);

    let mut formatted = Vec::with_capacity(original_lines.len());
    formatted.push(original_lines[0]);

    for i in 1..original_lines.len() {
        match translated_lines.get(i) {
            Some(line) if !line.trim().is_empty() => formatted.push(*line),
            _ => formatted.push(original_lines[i]),
        }
    }

    formatted.join("\n")
}

fn format_json(translated: &str, original: &str) -> String {
    if serde_json::from_str::<serde_json::Value>(original).is_err() {
        warn!("Original JSON does not parse, using raw translation");
        return translated.to_string();
    }

    match serde_json::from_str::<serde_json::Value>(translated)
        .and_then(|value| serde_json::to_string_pretty(&value))
    {
        Ok(pretty) => pretty,
        Err(e) => {
            warn!("JSON formatting failed, using raw translation: {}", e);
            translated.to_string()
        }
    }
}
