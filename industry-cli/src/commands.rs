//! Command implementations
//!
//! Read-only commands print text or JSON; editing commands load the file,
//! apply the change in memory and save through `LoadedFile::save`.

use anyhow::{bail, Context};
use serde::Serialize;
use tracing::{info, warn};

use industry_core::search::{self, Match, SearchField};
use industry_core::{CarTypes, IndustryFile, IndustryRecord, IndustrySummary, ProducerRecord, TrackRecord};

use crate::config::Config;
use crate::io::LoadedFile;

/// Field changes requested by `rename`
#[derive(Debug, Default)]
pub struct RenameArgs {
    pub name: Option<String>,
    pub local: Option<String>,
    pub symbol: Option<String>,
    pub process_in_blocks: Option<bool>,
}

/// Field changes requested by `producer`
#[derive(Debug, Default)]
pub struct ProducerArgs {
    pub car_type: Option<u8>,
    pub empties: Option<bool>,
    pub hours: Option<i32>,
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone)]
pub enum TagEdit {
    Add(String),
    Delete(String),
    Replace { old: String, new: String },
    Set(String),
}

#[derive(Serialize)]
struct IndexedSummary<'a> {
    index: usize,
    #[serde(flatten)]
    summary: &'a IndustrySummary,
}

#[derive(Serialize)]
struct ProducerView<'a> {
    index: usize,
    car_type: &'a str,
    #[serde(flatten)]
    producer: &'a ProducerRecord,
}

#[derive(Serialize)]
struct IndustryView<'a> {
    index: usize,
    name: &'a str,
    local_name: &'a str,
    symbol: &'a str,
    process_in_blocks: bool,
    unknown1: [u8; 4],
    tracks: &'a [TrackRecord],
    producers: Vec<ProducerView<'a>>,
}

#[derive(Serialize)]
struct CheckReport {
    industries: usize,
    input_bytes: u64,
    output_bytes: usize,
    trailing_bytes: usize,
    identical: bool,
}

#[derive(Serialize)]
struct EditReport {
    message: String,
    bytes_written: usize,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_car_types(config: &Config) -> anyhow::Result<CarTypes> {
    match &config.car_types {
        Some(path) => CarTypes::load(path).with_context(|| format!("Cannot load car types from {:?}", path)),
        None => Ok(CarTypes::new()),
    }
}

/// Save and report an edit
fn finish_edit(loaded: &LoadedFile, config: &Config, message: String) -> anyhow::Result<()> {
    if loaded.trailing_bytes() > 0 {
        warn!("Dropping {} bytes after the last industry", loaded.trailing_bytes());
    }
    let bytes_written = loaded.save(config)?;

    if config.json {
        print_json(&EditReport {
            message,
            bytes_written,
        })
    } else {
        println!("✓ {}", message);
        Ok(())
    }
}

/// Summary table, sorted by name unless `file_order` is set
pub fn list(config: &Config, file_order: bool) -> anyhow::Result<()> {
    let loaded = LoadedFile::load(&config.input)?;
    let rows: Vec<(usize, IndustrySummary)> = if file_order {
        loaded.file.summaries().into_iter().enumerate().collect()
    } else {
        loaded
            .file
            .sorted_by_name()
            .into_iter()
            .map(|(i, industry)| (i, industry.summary()))
            .collect()
    };

    if config.json {
        let rows: Vec<_> = rows
            .iter()
            .map(|(index, summary)| IndexedSummary { index: *index, summary })
            .collect();
        return print_json(&rows);
    }

    println!("{} industries:", rows.len());
    for (i, s) in &rows {
        println!(
            "  {:3}. {:<32} {:<8} {:<24} tracks: {:2}  producers: {:2}{}",
            i,
            s.name,
            s.symbol,
            s.local_name,
            s.track_count,
            s.producer_count,
            if s.process_in_blocks { "  [blocks]" } else { "" }
        );
    }
    Ok(())
}

pub fn show(config: &Config, index: usize) -> anyhow::Result<()> {
    let loaded = LoadedFile::load(&config.input)?;
    let car_types = load_car_types(config)?;
    let industry = loaded.file.industry(index)?;
    let view = industry_view(index, industry, &car_types);

    if config.json {
        return print_json(&view);
    }

    println!("Industry {}: {}", view.index, view.name);
    println!("  Local name:        {}", view.local_name);
    println!("  Symbol:            {}", view.symbol);
    println!("  Process in blocks: {}", view.process_in_blocks);
    println!("\nTracks ({}):", view.tracks.len());
    for track in view.tracks {
        println!(
            "  {}:{}:{}",
            track.route_prefix, track.track_section, track.track_direction
        );
    }
    println!("\nProducers ({}):", view.producers.len());
    for p in &view.producers {
        println!(
            "  {:2}. {:<20} (id {:3})  hours: {:3}  capacity: {:3}  empties: {:<5}  tags: {}",
            p.index,
            p.car_type,
            p.producer.car_type_id,
            p.producer.process_hours,
            p.producer.capacity,
            p.producer.produce_empties.get(),
            p.producer.summarize_tags()
        );
        if p.producer.filter_count() > 0 {
            let filters: Vec<&str> = p.producer.filters().iter().map(|f| f.name()).collect();
            println!("      filters: {}", filters.join(", "));
        }
    }
    Ok(())
}

fn industry_view<'a>(index: usize, industry: &'a IndustryRecord, car_types: &'a CarTypes) -> IndustryView<'a> {
    let producers = car_types
        .sort_producers(industry.producers())
        .into_iter()
        .map(|(i, producer)| ProducerView {
            index: i,
            car_type: car_types.name(producer.car_type_id),
            producer,
        })
        .collect();

    IndustryView {
        index,
        name: industry.name(),
        local_name: industry.local_name(),
        symbol: industry.symbol(),
        process_in_blocks: industry.process_in_blocks.get(),
        unknown1: industry.unknown1,
        tracks: industry.tracks(),
        producers,
    }
}

/// Parse and re-serialize, failing if the bytes differ
pub fn check(config: &Config) -> anyhow::Result<()> {
    let data = std::fs::read(&config.input).with_context(|| format!("Cannot read {:?}", config.input))?;
    let (file, consumed) = IndustryFile::parse_prefix(&data)
        .with_context(|| format!("Cannot parse {:?}", config.input))?;
    let output = file.serialize()?;

    let report = CheckReport {
        industries: file.industries.len(),
        input_bytes: data.len() as u64,
        output_bytes: output.len(),
        trailing_bytes: data.len() - consumed,
        identical: output[..] == data[..consumed],
    };
    if file.record_count as usize != file.industries.len() {
        warn!("Header record count {} does not match", file.record_count);
    }

    if config.json {
        print_json(&report)?;
    } else {
        println!(
            "{:?}: {} industries, {} bytes, round trip {}",
            config.input,
            report.industries,
            report.input_bytes,
            if report.identical { "identical" } else { "DIFFERS" }
        );
        if report.trailing_bytes > 0 {
            println!("  {} trailing bytes ignored", report.trailing_bytes);
        }
    }

    if !report.identical {
        bail!("Re-serialized file differs from {:?}", config.input);
    }
    Ok(())
}

pub fn rename(config: &Config, index: usize, args: RenameArgs) -> anyhow::Result<()> {
    if args.name.is_none() && args.local.is_none() && args.symbol.is_none() && args.process_in_blocks.is_none() {
        bail!("Nothing to change: pass --name, --local, --symbol or --process-in-blocks");
    }

    let mut loaded = LoadedFile::load(&config.input)?;
    let industry = loaded.file.industry_mut(index)?;

    // Validate everything before touching the record
    for text in [&args.name, &args.local, &args.symbol].into_iter().flatten() {
        industry_core::encode_string(text).with_context(|| format!("Cannot encode {:?}", text))?;
    }
    if let Some(name) = &args.name {
        industry.rename(name)?;
    }
    if let Some(local) = &args.local {
        industry.rename_local(local)?;
    }
    if let Some(symbol) = &args.symbol {
        industry.rename_symbol(symbol)?;
    }
    if let Some(blocks) = args.process_in_blocks {
        industry.process_in_blocks.set(blocks);
    }

    let message = format!("Updated industry {} ({})", index, industry.name());
    info!("{}", message);
    finish_edit(&loaded, config, message)
}

/// Parse `prefix:section:direction`
pub fn parse_track(text: &str) -> Result<TrackRecord, String> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("expected prefix:section:direction, got '{}'", text));
    }
    let mut values = [0i32; 3];
    for (value, part) in values.iter_mut().zip(&parts) {
        *value = part
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not an integer in '{}'", part, text))?;
    }
    Ok(TrackRecord::new(values[0], values[1], values[2]))
}

pub fn tracks(config: &Config, index: usize, tracks: Vec<TrackRecord>) -> anyhow::Result<()> {
    let mut loaded = LoadedFile::load(&config.input)?;
    let industry = loaded.file.industry_mut(index)?;
    let count = tracks.len();
    industry.set_tracks(tracks);

    let message = format!("Set {} tracks on industry {} ({})", count, index, industry.name());
    finish_edit(&loaded, config, message)
}

pub fn tag(config: &Config, index: usize, producer: usize, edit: TagEdit) -> anyhow::Result<()> {
    let mut loaded = LoadedFile::load(&config.input)?;
    let target = loaded.file.industry_mut(index)?.producer_mut(producer)?;

    let message = match &edit {
        TagEdit::Add(name) => {
            target.add_tag(name)?;
            format!("Added tag {}", name)
        }
        TagEdit::Delete(name) => {
            if !target.delete_tag(name) {
                bail!("Producer {} has no tag {:?}", producer, name);
            }
            format!("Deleted tag {}", name)
        }
        TagEdit::Replace { old, new } => {
            if !target.replace_tag(old, new)? {
                bail!("Producer {} has no tag {:?}", producer, old);
            }
            if new.is_empty() {
                format!("Deleted tag {}", old)
            } else {
                format!("Replaced tag {} with {}", old, new)
            }
        }
        TagEdit::Set(list) => {
            target.set_tags_from_list(list)?;
            format!("Set tags to [{}]", target.summarize_tags())
        }
    };

    finish_edit(&loaded, config, format!("{} (industry {}, producer {})", message, index, producer))
}

pub fn producer(config: &Config, index: usize, producer: usize, args: ProducerArgs) -> anyhow::Result<()> {
    if args.car_type.is_none() && args.empties.is_none() && args.hours.is_none() && args.capacity.is_none() {
        bail!("Nothing to change: pass --car-type, --empties, --hours or --capacity");
    }

    let mut loaded = LoadedFile::load(&config.input)?;
    let target = loaded.file.industry_mut(index)?.producer_mut(producer)?;

    if let Some(id) = args.car_type {
        target.car_type_id = id;
    }
    if let Some(empties) = args.empties {
        target.produce_empties.set(empties);
    }
    if let Some(hours) = args.hours {
        target.process_hours = hours;
    }
    if let Some(capacity) = args.capacity {
        target.capacity = capacity;
    }

    finish_edit(&loaded, config, format!("Updated producer {} of industry {}", producer, index))
}

pub fn find(config: &Config, field: SearchField, text: &str) -> anyhow::Result<()> {
    let loaded = LoadedFile::load(&config.input)?;
    let matches = search::find(&loaded.file, field, text);

    if config.json {
        return print_json(&matches);
    }

    println!("{} matches for {} {:?}", matches.len(), field, text);
    for m in &matches {
        let industry = &loaded.file.industries[m.industry()];
        match *m {
            Match::Field { industry: i } => println!("  {:3}. {}", i, industry.name()),
            Match::Tag { industry: i, producer, tag } => {
                println!("  {:3}. {}  producer {} tag {}", i, industry.name(), producer, tag)
            }
        }
    }
    Ok(())
}

pub fn replace(config: &Config, field: SearchField, find_text: &str, replacement: &str) -> anyhow::Result<()> {
    let mut loaded = LoadedFile::load(&config.input)?;
    let report = search::replace_all(&mut loaded.file, field, find_text, replacement)?;

    if report.occurrences == 0 {
        bail!("No {} matches {:?}", field, find_text);
    }

    let verb = if report.deleted { "Deleted" } else { "Replaced" };
    let message = format!(
        "{} {} {} occurrence(s) in {} industries",
        verb, report.occurrences, field, report.industries
    );
    finish_edit(&loaded, config, message)
}
