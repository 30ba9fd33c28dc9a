//! The binary results format.
//!
//! Layout (all integers in native byte order, strings prefixed with a `u16`
//! length):
//!
//! ```text
//! magic "IYFR" | version u8 = 1 | frame_data_missing u8 | any_records u8 | with_cookie u8
//! u64 thread_count, then that many names
//! u64 frame_count,  then (u64 number, i64 start_ns, i64 end_ns) each
//! u64 tag_count,    then (u32 id ascending from 0, name, r, g, b, a) each
//! u64 scope_count,  then (u32 key, u32 tag, name, function, file, u32 line) each
//! per thread:       u64 event_count, then
//!                   (u32 key, i32 depth, i64 start_ns, i64 end_ns[, u64 cookie]) each
//! ```
//!
//! The cookie column is present exactly when the `with_cookie` header flag is
//! set. Native byte order makes the format non-portable across architectures
//! of differing endianness; writer and reader must agree.

use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::{debug, warn};

use crate::domain::{
    FrameData, ReadError, RecordedEvent, ScopeInfo, ScopeKey, Tag, TagColor, TagEntry,
};
use crate::trace_data::ProfilerResults;

const MAGIC: [u8; 4] = *b"IYFR";
const VERSION: u8 = 1;

pub(crate) fn write_to_file(results: &ProfilerResults, path: &Path) -> bool {
    let file = match File::create(path) {
        Ok(file) => file,
        Err(err) => {
            warn!("cannot create results file {}: {err}", path.display());
            return false;
        }
    };

    let mut writer = BufWriter::new(file);
    if let Err(err) = write_results(results, &mut writer).and_then(|()| writer.flush()) {
        warn!("cannot write results file {}: {err}", path.display());
        return false;
    }
    true
}

pub(crate) fn load_from_file(path: &Path) -> Option<ProfilerResults> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            debug!("cannot open results file {}: {err}", path.display());
            return None;
        }
    };

    match read_results(&mut BufReader::new(file)) {
        Ok(results) => Some(results),
        Err(err) => {
            debug!("cannot read results file {}: {err}", path.display());
            None
        }
    }
}

pub(crate) fn write_results<W: Write>(
    results: &ProfilerResults,
    writer: &mut W,
) -> std::io::Result<()> {
    debug_assert_eq!(results.thread_names.len(), results.events.len());

    writer.write_all(&MAGIC)?;
    write_u8(writer, VERSION)?;
    write_u8(writer, results.frame_data_missing as u8)?;
    write_u8(writer, results.any_records as u8)?;
    write_u8(writer, results.with_cookie as u8)?;

    write_u64(writer, results.thread_names.len() as u64)?;
    for name in &results.thread_names {
        write_str(writer, name)?;
    }

    write_u64(writer, results.frames.len() as u64)?;
    for frame in &results.frames {
        write_u64(writer, frame.number)?;
        write_i64(writer, frame.start_ns)?;
        write_i64(writer, frame.end_ns)?;
    }

    write_u64(writer, results.tags.len() as u64)?;
    for (id, tag) in results.tags.iter().enumerate() {
        write_u32(writer, id as u32)?;
        write_str(writer, &tag.name)?;
        write_u8(writer, tag.color.r)?;
        write_u8(writer, tag.color.g)?;
        write_u8(writer, tag.color.b)?;
        write_u8(writer, tag.color.a)?;
    }

    write_u64(writer, results.scopes.len() as u64)?;
    for scope in results.scopes.values() {
        write_u32(writer, scope.key.0)?;
        write_u32(writer, scope.tag.0)?;
        write_str(writer, &scope.name)?;
        write_str(writer, &scope.function)?;
        write_str(writer, &scope.file)?;
        write_u32(writer, scope.line)?;
    }

    for queue in &results.events {
        write_u64(writer, queue.len() as u64)?;
        for event in queue {
            write_u32(writer, event.key.0)?;
            write_i32(writer, event.depth)?;
            write_i64(writer, event.start_ns)?;
            write_i64(writer, event.end_ns)?;
            if results.with_cookie {
                write_u64(writer, event.cookie.unwrap_or(0))?;
            }
        }
    }

    Ok(())
}

pub(crate) fn read_results<R: Read>(reader: &mut R) -> Result<ProfilerResults, ReadError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(ReadError::BadMagic);
    }

    let version = read_u8(reader)?;
    if version != VERSION {
        return Err(ReadError::UnsupportedVersion(version));
    }

    let frame_data_missing = read_u8(reader)? != 0;
    let any_records = read_u8(reader)? != 0;
    let with_cookie = read_u8(reader)? != 0;

    let thread_count = read_u64(reader)? as usize;
    let mut thread_names = Vec::with_capacity(thread_count.min(1024));
    for _ in 0..thread_count {
        thread_names.push(read_str(reader)?);
    }

    let frame_count = read_u64(reader)?;
    let mut frames = VecDeque::new();
    for _ in 0..frame_count {
        let number = read_u64(reader)?;
        let start_ns = read_i64(reader)?;
        let end_ns = read_i64(reader)?;
        frames.push_back(FrameData { number, start_ns, end_ns });
    }

    let tag_count = read_u64(reader)?;
    let mut tags = Vec::new();
    for expected_id in 0..tag_count {
        let id = read_u32(reader)?;
        if u64::from(id) != expected_id {
            return Err(ReadError::Malformed("tag ids must ascend from 0"));
        }
        let name = read_str(reader)?;
        let r = read_u8(reader)?;
        let g = read_u8(reader)?;
        let b = read_u8(reader)?;
        let a = read_u8(reader)?;
        tags.push(TagEntry { name, color: TagColor::new(r, g, b, a) });
    }

    let scope_count = read_u64(reader)?;
    let mut scopes = HashMap::new();
    for _ in 0..scope_count {
        let key = ScopeKey(read_u32(reader)?);
        let tag = Tag(read_u32(reader)?);
        let name = read_str(reader)?;
        let function = read_str(reader)?;
        let file = read_str(reader)?;
        let line = read_u32(reader)?;
        scopes.insert(key, ScopeInfo { key, tag, name, function, file, line });
    }

    let mut events = Vec::with_capacity(thread_count.min(1024));
    for _ in 0..thread_count {
        let event_count = read_u64(reader)?;
        let mut queue = VecDeque::new();
        for _ in 0..event_count {
            let key = ScopeKey(read_u32(reader)?);
            let depth = read_i32(reader)?;
            let start_ns = read_i64(reader)?;
            let end_ns = read_i64(reader)?;
            let cookie = if with_cookie { Some(read_u64(reader)?) } else { None };
            queue.push_back(RecordedEvent { key, depth, start_ns, end_ns, cookie });
        }
        events.push(queue);
    }

    Ok(ProfilerResults {
        frames,
        scopes,
        tags,
        events,
        thread_names,
        frame_data_missing,
        any_records,
        with_cookie,
    })
}

fn write_u8<W: Write>(writer: &mut W, value: u8) -> std::io::Result<()> {
    writer.write_all(&[value])
}

fn write_u32<W: Write>(writer: &mut W, value: u32) -> std::io::Result<()> {
    writer.write_all(&value.to_ne_bytes())
}

fn write_i32<W: Write>(writer: &mut W, value: i32) -> std::io::Result<()> {
    writer.write_all(&value.to_ne_bytes())
}

fn write_u64<W: Write>(writer: &mut W, value: u64) -> std::io::Result<()> {
    writer.write_all(&value.to_ne_bytes())
}

fn write_i64<W: Write>(writer: &mut W, value: i64) -> std::io::Result<()> {
    writer.write_all(&value.to_ne_bytes())
}

fn write_str<W: Write>(writer: &mut W, value: &str) -> std::io::Result<()> {
    let len = value.len().min(usize::from(u16::MAX));
    writer.write_all(&(len as u16).to_ne_bytes())?;
    writer.write_all(&value.as_bytes()[..len])
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8, ReadError> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, ReadError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_ne_bytes(buf))
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32, ReadError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_ne_bytes(buf))
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64, ReadError> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_ne_bytes(buf))
}

fn read_i64<R: Read>(reader: &mut R) -> Result<i64, ReadError> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(i64::from_ne_bytes(buf))
}

fn read_str<R: Read>(reader: &mut R) -> Result<String, ReadError> {
    let mut len_buf = [0u8; 2];
    reader.read_exact(&mut len_buf)?;
    let len = usize::from(u16::from_ne_bytes(len_buf));

    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|_| ReadError::Malformed("string is not valid utf-8"))
}
