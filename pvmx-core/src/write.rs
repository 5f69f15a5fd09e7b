use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{LE, WriteBytesExt};
use indexmap::IndexMap;

use crate::error::{PvmxError, Result};
use crate::index;
use crate::pak::{DictionaryField, MAGIC, TexPackEntry, VERSION};
use crate::spec;

/// File position of one zero offset/size placeholder, keyed by the entry
/// name it must be resolved against.
#[derive(Debug, Clone)]
struct PatchSlot {
    position: u64,
    name: String,
}

/// Two-pass archive writer.
///
/// [`append_entry`](Self::append_entry) encodes dictionary entries with zero
/// offset/size placeholders, recording where each placeholder lives.
/// [`finish`](Self::finish) closes the dictionary, streams the payloads, and
/// revisits every recorded slot with the resolved range.
pub struct PvmxWriter<W: Write + Seek> {
    inner: W,
    patches: Vec<PatchSlot>,
}

impl<W: Write + Seek> PvmxWriter<W> {
    /// Create a writer and emit the archive header.
    pub fn new(mut inner: W) -> Result<Self> {
        let header = spec::Header {
            magic: MAGIC,
            version: VERSION,
        };
        inner.write_all(&header.into_bytes())?;

        Ok(Self {
            inner,
            patches: Vec::new(),
        })
    }

    /// Encode one dictionary entry.
    ///
    /// Field order: global index, name, dimensions (only when recorded), a
    /// `None` tag closing the field list, then the offset/size placeholder.
    pub fn append_entry(&mut self, entry: &TexPackEntry) -> Result<()> {
        if let Some(global_index) = entry.global_index {
            self.inner.write_u8(DictionaryField::GlobalIndex.tag())?;
            self.inner.write_u32::<LE>(global_index)?;
        }

        self.inner.write_u8(DictionaryField::Name.tag())?;
        self.inner.write_all(entry.name.as_bytes())?;
        self.inner.write_u8(0)?;

        if entry.has_dimensions() {
            self.inner.write_u8(DictionaryField::Dimensions.tag())?;
            self.inner.write_u32::<LE>(entry.width)?;
            self.inner.write_u32::<LE>(entry.height)?;
        }

        self.inner.write_u8(DictionaryField::None.tag())?;

        self.patches.push(PatchSlot {
            position: self.inner.stream_position()?,
            name: entry.name.clone(),
        });
        self.inner.write_u64::<LE>(0)?;
        self.inner.write_u64::<LE>(0)?;

        Ok(())
    }

    /// Close the dictionary, write the data section, backpatch every
    /// placeholder, and return the underlying writer.
    ///
    /// Payloads are read from `source_dir` in first-reference order; a name
    /// referenced by several entries is stored once and all of its entries
    /// patched with the same range. `progress` is called once per payload
    /// file actually written.
    pub fn finish<F>(mut self, source_dir: &Path, mut progress: F) -> Result<W>
    where
        F: FnMut(&str),
    {
        // End of dictionary: an element starting with a `None` tag.
        self.inner.write_u8(DictionaryField::None.tag())?;

        // Tracks payload offsets and sizes by entry name.
        let mut file_meta: IndexMap<&str, (u64, u64)> = IndexMap::new();

        for slot in &self.patches {
            if file_meta.contains_key(slot.name.as_str()) {
                continue;
            }

            let path = source_dir.join(&slot.name);
            let file = File::open(&path).map_err(|e| PvmxError::io_at(&path, e))?;
            progress(&slot.name);

            let offset = self.inner.stream_position()?;
            let size = std::io::copy(&mut BufReader::new(file), &mut self.inner)?;
            file_meta.insert(slot.name.as_str(), (offset, size));
        }

        for slot in &self.patches {
            let (offset, size) = file_meta[slot.name.as_str()];
            self.inner.seek(SeekFrom::Start(slot.position))?;
            self.inner.write_u64::<LE>(offset)?;
            self.inner.write_u64::<LE>(size)?;
        }

        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Create an archive from a texture pack index.
///
/// `input` is either the index file itself or a directory holding an
/// `index.txt`. Payloads are resolved relative to the index file's
/// directory. When `output` is absent the archive lands next to the index
/// directory as `<dir-name>.pvmx`. `progress` is called once per payload
/// file written. Returns the path of the written archive.
///
/// Any malformed index entry or missing payload file aborts the whole
/// operation; a partially written output file is left behind as-is.
pub fn create_archive<F>(input: &Path, output: Option<&Path>, progress: F) -> Result<PathBuf>
where
    F: FnMut(&str),
{
    let index_path = if input.is_dir() {
        input.join("index.txt")
    } else {
        input.to_path_buf()
    };
    if !index_path.is_file() {
        return Err(PvmxError::FileNotFound(index_path));
    }

    let output_path = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_path(&index_path)?,
    };

    let index_file = File::open(&index_path).map_err(|e| PvmxError::io_at(&index_path, e))?;
    let entries = index::read_index(BufReader::new(index_file))?;

    let index_dir = index_path.parent().unwrap_or(Path::new(".")).to_path_buf();

    let out_file = File::create(&output_path).map_err(|e| PvmxError::io_at(&output_path, e))?;
    let mut writer = PvmxWriter::new(BufWriter::new(out_file))?;
    for entry in &entries {
        writer.append_entry(entry)?;
    }
    writer.finish(&index_dir, progress)?;

    Ok(output_path)
}

/// `<parent-of-index-dir>/<index-dir-name>.pvmx`
fn default_output_path(index_path: &Path) -> Result<PathBuf> {
    let path = std::path::absolute(index_path)?;
    let dir = path.parent().unwrap_or(Path::new("."));
    let name = dir
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or("output".to_string());
    let parent = dir.parent().unwrap_or(Path::new("."));

    Ok(parent.join(format!("{name}.pvmx")))
}
