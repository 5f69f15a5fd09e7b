use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{PvmxError, Result};
use crate::index;
use crate::pak::DictionaryEntry;
use crate::read;

/// Progress notifications emitted while an archive is extracted.
#[derive(Debug, Clone)]
pub enum ExtractEvent<'a> {
    Start { total: usize },
    FileStart { name: &'a str },
    FileDone { name: &'a str },
}

/// Summary of one extraction run.
#[derive(Debug)]
pub struct ExtractReport {
    pub extracted: usize,
    pub output_dir: PathBuf,
}

/// Extract an archive into a directory, regenerating its `index.txt`.
///
/// The header is validated before anything is created on disk; a corrupt
/// magic or version produces no output. When `output` is absent the files
/// land in `<input-dir>/<input-stem>/`, created if missing. Entries are
/// written strictly in dictionary order, one regenerated index line each.
pub fn extract_archive<F>(input: &Path, output: Option<&Path>, mut on_event: F) -> Result<ExtractReport>
where
    F: FnMut(ExtractEvent),
{
    let file = File::open(input).map_err(|e| PvmxError::io_at(input, e))?;
    let file_size = file.metadata()?.len();
    let mut reader = BufReader::new(file);

    let archive = read::read_archive(&mut reader)?;

    let output_dir = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_dir(input)?,
    };
    if !output_dir.is_dir() {
        std::fs::create_dir_all(&output_dir).map_err(|e| PvmxError::io_at(&output_dir, e))?;
    }

    let index_path = output_dir.join("index.txt");
    let index_file = File::create(&index_path).map_err(|e| PvmxError::io_at(&index_path, e))?;
    let mut index_file = BufWriter::new(index_file);
    for entry in archive.entries() {
        writeln!(index_file, "{}", index::format_line(&entry.texture))?;
    }
    index_file.flush()?;

    on_event(ExtractEvent::Start {
        total: archive.entries().len(),
    });

    for entry in archive.entries() {
        on_event(ExtractEvent::FileStart {
            name: &entry.texture.name,
        });
        write_entry(&mut reader, entry, &output_dir, file_size)?;
        on_event(ExtractEvent::FileDone {
            name: &entry.texture.name,
        });
    }

    Ok(ExtractReport {
        extracted: archive.entries().len(),
        output_dir,
    })
}

fn write_entry(
    reader: &mut BufReader<File>,
    entry: &DictionaryEntry,
    output_dir: &Path,
    file_size: u64,
) -> Result<()> {
    let in_range = entry
        .offset
        .checked_add(entry.size)
        .is_some_and(|end| end <= file_size);
    if !in_range {
        return Err(PvmxError::InvalidEntryRange {
            offset: entry.offset,
            size: entry.size,
            file_size,
        });
    }

    let out_path = output_dir.join(&entry.texture.name);
    if let Some(parent) = out_path.parent()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| PvmxError::io_at(parent, e))?;
    }

    let out_file = File::create(&out_path).map_err(|e| PvmxError::io_at(&out_path, e))?;
    let mut out_file = BufWriter::new(out_file);
    read::copy_entry_data(reader, entry, &mut out_file)?;
    out_file.flush()?;

    Ok(())
}

/// `<input-dir>/<input-basename-without-extension>`
fn default_output_dir(input: &Path) -> Result<PathBuf> {
    let path = std::path::absolute(input)?;
    let parent = path.parent().unwrap_or(Path::new("."));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or("output".to_string());

    Ok(parent.join(stem))
}
