use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nitf_oxide::base::{Model, ReaderSource};
use nitf_oxide::model::nitf::{
    copy_between_paths, rewrite_header, CopyMode, FileSource, NitfFile, ParseOptions, Result,
    SegmentCategory,
};

fn cli() -> Command {
    let file = || {
        Arg::new("file")
            .value_name("FILE")
            .help("NITF file to read")
            .required(true)
            .value_parser(value_parser!(PathBuf))
    };

    Command::new("nitf-info")
        .about("Prints NITF header fields and extracts or copies segments")
        .arg(file().required(false))
        .arg(
            Arg::new("lenient")
                .long("lenient")
                .help("Accept files whose declared lengths do not add up")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(Command::new("version").about("Print FHDR and FVER").arg(file()))
        .subcommand(Command::new("counts").about("Print the segment counts").arg(file()))
        .subcommand(
            Command::new("extract-des")
                .about("Write DES segments, sub-header and data, to files")
                .arg(file())
                .arg(
                    Arg::new("index")
                        .short('i')
                        .long("index")
                        .help("Zero-based DES index; every DES when absent")
                        .value_parser(value_parser!(u16)),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("PATH")
                        .help("Output file with --index, output directory without")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("header-only")
                        .long("header-only")
                        .help("Write the sub-header alone")
                        .requires("index")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("extract-jp2")
                .about("Write JPEG 2000 codestreams to a directory")
                .arg(file())
                .arg(
                    Arg::new("out-dir")
                        .short('o')
                        .long("out-dir")
                        .value_name("DIR")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("index")
                        .short('i')
                        .long("index")
                        .help("Only this image")
                        .value_parser(value_parser!(u16)),
                ),
        )
        .subcommand(
            Command::new("copy")
                .about("Copy segment categories into another file, rewriting it in place")
                .arg(
                    Arg::new("source")
                        .value_name("SOURCE")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("target")
                        .value_name("TARGET")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("category")
                        .short('c')
                        .long("category")
                        .help("Category to copy, repeatable")
                        .action(ArgAction::Append)
                        .default_values(["graphic", "text", "des"])
                        .value_parser(["image", "graphic", "label", "text", "des", "res"]),
                )
                .arg(
                    Arg::new("replace")
                        .long("replace")
                        .help("Replace the target's segments instead of appending")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("edit")
                .about("Rewrite file header fields in place")
                .arg(file())
                .arg(text_field("title", "FTITLE"))
                .arg(text_field("originator", "ONAME"))
                .arg(text_field("phone", "OPHONE"))
                .arg(text_field("station", "OSTAID"))
                .arg(text_field("date", "FDT, CCYYMMDDhhmmss")),
        )
}

fn text_field(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(id).value_name("VALUE").help(help)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nitf_oxide=info,nitf_info=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn open(matches: &ArgMatches, lenient: bool) -> Result<NitfFile<FileSource>> {
    let path = required_path(matches, "file");
    if lenient {
        let source = ReaderSource::new(File::open(&path)?)?;
        NitfFile::parse_with(source, ParseOptions::lenient())
    } else {
        NitfFile::<FileSource>::open(&path)
    }
}

fn required_path(matches: &ArgMatches, id: &str) -> PathBuf {
    matches.get_one::<PathBuf>(id).cloned().unwrap_or_default()
}


fn run(matches: &ArgMatches) -> Result<()> {
    let lenient = matches.get_flag("lenient");
    match matches.subcommand() {
        Some(("version", sub)) => println!("{}", open(sub, lenient)?.version()),
        Some(("counts", sub)) => {
            let nitf = open(sub, lenient)?;
            for category in SegmentCategory::ALL.iter().copied() {
                println!(
                    "{}: {}",
                    category.count_field(nitf.header().version()),
                    nitf.count(category)
                );
            }
        }
        Some(("extract-des", sub)) => {
            let nitf = open(sub, lenient)?;
            let output = required_path(sub, "output");
            match sub.get_one::<u16>("index") {
                Some(index) => {
                    let bytes = if sub.get_flag("header-only") {
                        nitf.extract_des_header(*index)?
                    } else {
                        nitf.extract_des(*index)?
                    };
                    fs::write(&output, bytes)?;
                    println!("{}", output.display());
                }
                None => {
                    for path in nitf.extract_all_des(&output)? {
                        println!("{}", path.display());
                    }
                }
            }
        }
        Some(("extract-jp2", sub)) => {
            let nitf = open(sub, lenient)?;
            let out_dir = required_path(sub, "out-dir");
            match sub.get_one::<u16>("index") {
                Some(index) => {
                    let location = nitf.locate_jp2(*index)?;
                    fs::create_dir_all(&out_dir)?;
                    let path = out_dir.join(location.file_name());
                    fs::write(&path, nitf.extract_jp2_index(*index)?)?;
                    println!("{}", path.display());
                }
                None => {
                    for path in nitf.extract_all_jp2(&out_dir)? {
                        println!("{}", path.display());
                    }
                }
            }
        }
        Some(("copy", sub)) => {
            let categories = sub
                .get_many::<String>("category")
                .into_iter()
                .flatten()
                .map(|name| name.parse())
                .collect::<Result<Vec<SegmentCategory>>>()?;
            let mode = if sub.get_flag("replace") {
                CopyMode::Replace
            } else {
                CopyMode::Append
            };
            let header = copy_between_paths(
                &required_path(sub, "source"),
                &required_path(sub, "target"),
                &categories,
                mode,
            )?;
            println!("FL: {}", header.file_length);
        }
        Some(("edit", sub)) => {
            let value = |id: &str| sub.get_one::<String>(id).map(String::as_str);
            let header = rewrite_header(&required_path(sub, "file"), |header| {
                if let Some(title) = value("title") {
                    header.set_title(title)?;
                }
                if let Some(name) = value("originator") {
                    header.set_originator_name(name)?;
                }
                if let Some(phone) = value("phone") {
                    header.set_originator_phone(phone)?;
                }
                if let Some(station) = value("station") {
                    header.set_originating_station(station)?;
                }
                if let Some(date_time) = value("date") {
                    header.set_date_time(date_time)?;
                }
                Ok(())
            })?;
            for (field, value) in header.fields() {
                println!("{}: {}", field, value);
            }
        }
        _ => match matches.get_one::<PathBuf>("file") {
            Some(_) => print!("{}", open(matches, lenient)?),
            None => {
                let _ = cli().print_help();
            }
        },
    }
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let matches = cli().get_matches();
    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "nitf-info failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nitf_oxide::model::nitf::{NitfBuilder, NitfVersion};

    #[test]
    fn arguments_are_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn extract_des_honours_lenient() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = NitfBuilder::version(NitfVersion::Nitf21)
            .unwrap()
            .segment(SegmentCategory::Des, b"DE-header".to_vec(), b"payload".to_vec())
            .build()
            .unwrap();
        bytes.extend_from_slice(b"trailing");
        let input = dir.path().join("trailing.ntf");
        fs::write(&input, &bytes).unwrap();
        let output = dir.path().join("des.bin");
        let (input, output) = (input.to_str().unwrap(), output.to_str().unwrap());

        let strict = cli()
            .try_get_matches_from(["nitf-info", "extract-des", input, "-i", "0", "-o", output])
            .unwrap();
        assert!(run(&strict).is_err());

        let lenient = cli()
            .try_get_matches_from([
                "nitf-info", "--lenient", "extract-des", input, "-i", "0", "-o", output,
            ])
            .unwrap();
        run(&lenient).unwrap();
        assert_eq!(fs::read(output).unwrap(), b"DE-headerpayload");
    }

    #[test]
    fn copy_rejects_unknown_categories() {
        let parsed = cli().try_get_matches_from(["nitf-info", "copy", "a.ntf", "b.ntf", "-c", "desk"]);
        assert!(parsed.is_err());
    }
}
