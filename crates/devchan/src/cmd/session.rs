use std::fs::File;
use std::io::{self, BufRead, BufReader};

use devchan_buffer::{TransferError, CAPACITY};
use devchan_host::{Host, LocalHost};
use devchan_module::{read_to_end, Channel, Module};
use tracing::debug;

use crate::cmd::SessionArgs;
use crate::exit::{io_error, module_error, transfer_code, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_record, print_table, OpRecord, OutputFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Device,
    Status,
}

impl Target {
    fn parse(word: &str) -> Result<Self, String> {
        match word {
            "device" | "dev" => Ok(Self::Device),
            "status" | "proc" => Ok(Self::Status),
            "" => Err("missing channel (device|status)".to_string()),
            other => Err(format!("unknown channel: {other}")),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::Status => "status",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Device => 0,
            Self::Status => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    Open,
    Close,
    Read {
        target: Target,
        offset: Option<usize>,
        len: usize,
    },
    Write {
        target: Target,
        offset: Option<usize>,
        data: Vec<u8>,
    },
    Cat {
        target: Target,
        offset: Option<usize>,
    },
    Seek {
        target: Target,
        offset: usize,
    },
    Stats,
}

impl Op {
    fn name(&self) -> &'static str {
        match self {
            Op::Open => "open",
            Op::Close => "close",
            Op::Read { .. } => "read",
            Op::Write { .. } => "write",
            Op::Cat { .. } => "cat",
            Op::Seek { .. } => "seek",
            Op::Stats => "stats",
        }
    }

    fn target(&self) -> Option<Target> {
        match self {
            Op::Read { target, .. }
            | Op::Write { target, .. }
            | Op::Cat { target, .. }
            | Op::Seek { target, .. } => Some(*target),
            Op::Open | Op::Close | Op::Stats => None,
        }
    }
}

pub fn run(args: SessionArgs, format: OutputFormat) -> CliResult<i32> {
    let source: Box<dyn BufRead> = match &args.script {
        Some(path) => {
            let file = File::open(path).map_err(|err| {
                io_error(&format!("failed opening {}", path.display()), err)
            })?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };

    let module = Module::init(LocalHost::new(), args.module.to_config())
        .map_err(|err| module_error("module init failed", err))?;
    let mut session = Session::new(&module);
    let mut table_rows = Vec::new();
    let mut code = SUCCESS;

    for (idx, line) in source.lines().enumerate() {
        let line = line.map_err(|err| io_error("failed reading operations", err))?;
        let line_no = idx + 1;
        let op = match parse_op(&line) {
            Ok(Some(op)) => op,
            Ok(None) => continue,
            Err(msg) => return Err(CliError::new(USAGE, format!("line {line_no}: {msg}"))),
        };

        let record = match session.apply(line_no, op.clone()) {
            Ok(record) => record,
            Err(err) => {
                code = transfer_code(&err);
                let mut record = OpRecord::new(line_no, op.name());
                record.channel = op.target().map(|t| t.label().to_string());
                record.error = Some(err.to_string());
                record
            }
        };

        match format {
            OutputFormat::Table => table_rows.push(record),
            _ => print_record(&record, format),
        }
    }

    if matches!(format, OutputFormat::Table) {
        print_table(&table_rows);
    }
    module.teardown();
    Ok(code)
}

/// Channel operations against one loaded module, with a cursor per channel.
///
/// Operations that name an offset use it; the others continue from wherever
/// the previous transfer on that channel left the cursor.
struct Session<'m, H: Host> {
    module: &'m Module<H>,
    cursors: [usize; 2],
}

impl<'m, H: Host> Session<'m, H> {
    fn new(module: &'m Module<H>) -> Self {
        Self {
            module,
            cursors: [0; 2],
        }
    }

    fn channel(&self, target: Target) -> &'m dyn Channel {
        match target {
            Target::Device => self.module.device(),
            Target::Status => self.module.status(),
        }
    }

    fn cursor(&self, target: Target, offset: Option<usize>) -> usize {
        offset.unwrap_or(self.cursors[target.index()])
    }

    fn apply(&mut self, line: usize, op: Op) -> Result<OpRecord, TransferError> {
        let mut record = OpRecord::new(line, op.name());
        record.channel = op.target().map(|t| t.label().to_string());
        debug!(line, op = op.name(), "applying operation");

        match op {
            Op::Open => {
                self.module.device().open();
                self.cursors[Target::Device.index()] = 0;
                record.offset = Some(0);
            }
            Op::Close => self.module.device().close(),
            Op::Read {
                target,
                offset,
                len,
            } => {
                let start = self.cursor(target, offset);
                let mut dst = vec![0u8; len.min(CAPACITY)];
                let transfer = self.channel(target).read(&mut dst, start);
                dst.truncate(transfer.count);
                self.cursors[target.index()] = transfer.offset;
                record.count = Some(transfer.count);
                record.offset = Some(transfer.offset);
                record = record.with_payload(dst.into());
            }
            Op::Write {
                target,
                offset,
                data,
            } => {
                let start = self.cursor(target, offset);
                let transfer = self.channel(target).write(&data, start)?;
                self.cursors[target.index()] = transfer.offset;
                record.count = Some(transfer.count);
                record.offset = Some(transfer.offset);
            }
            Op::Cat { target, offset } => {
                let start = self.cursor(target, offset);
                let (data, end) = read_to_end(self.channel(target), start);
                self.cursors[target.index()] = end;
                record.count = Some(data.len());
                record.offset = Some(end);
                record = record.with_payload(data);
            }
            Op::Seek { target, offset } => {
                self.cursors[target.index()] = offset;
                record.offset = Some(offset);
            }
            Op::Stats => record.counters = Some(self.module.device().counters()),
        }
        Ok(record)
    }
}

fn parse_op(line: &str) -> Result<Option<Op>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = split_word(line);
    let op = match verb {
        "open" => no_args(Op::Open, rest)?,
        "close" => no_args(Op::Close, rest)?,
        "stats" => no_args(Op::Stats, rest)?,
        "read" => {
            let (target, rest) = split_word(rest);
            let target = Target::parse(target)?;
            let nums = parse_numbers(rest)?;
            let (offset, len) = match nums.as_slice() {
                [len] => (None, *len),
                [offset, len] => (Some(*offset), *len),
                _ => return Err("usage: read <channel> [offset] <len>".to_string()),
            };
            Op::Read {
                target,
                offset,
                len,
            }
        }
        "write" => {
            let (target, rest) = split_word(rest);
            let target = Target::parse(target)?;
            let (first, tail) = split_word(rest);
            let (offset, text) = match first.parse::<usize>() {
                Ok(offset) if !tail.is_empty() => (Some(offset), tail),
                _ => (None, rest),
            };
            if text.is_empty() {
                return Err("usage: write <channel> [offset] <text>".to_string());
            }
            Op::Write {
                target,
                offset,
                data: unescape(text),
            }
        }
        "cat" => {
            let (target, rest) = split_word(rest);
            let target = Target::parse(target)?;
            let offset = match parse_numbers(rest)?.as_slice() {
                [] => None,
                [offset] => Some(*offset),
                _ => return Err("usage: cat <channel> [offset]".to_string()),
            };
            Op::Cat { target, offset }
        }
        "seek" => {
            let (target, rest) = split_word(rest);
            let target = Target::parse(target)?;
            match parse_numbers(rest)?.as_slice() {
                [offset] => Op::Seek {
                    target,
                    offset: *offset,
                },
                _ => return Err("usage: seek <channel> <offset>".to_string()),
            }
        }
        other => return Err(format!("unknown operation: {other}")),
    };
    Ok(Some(op))
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(end) => (&input[..end], input[end..].trim_start()),
        None => (input, ""),
    }
}

fn no_args(op: Op, rest: &str) -> Result<Op, String> {
    if rest.is_empty() {
        Ok(op)
    } else {
        Err(format!("{} takes no arguments", op.name()))
    }
}

fn parse_numbers(input: &str) -> Result<Vec<usize>, String> {
    input
        .split_whitespace()
        .map(|word| {
            word.parse::<usize>()
                .map_err(|_| format!("invalid number: {word}"))
        })
        .collect()
}

/// Expand `\n`, `\t`, `\0` and `\\`. Unknown escapes are kept as written.
fn unescape(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut utf8 = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
            continue;
        }
        match chars.next() {
            Some('n') => out.push(b'\n'),
            Some('t') => out.push(b'\t'),
            Some('0') => out.push(0),
            Some('\\') => out.push(b'\\'),
            Some(other) => {
                out.push(b'\\');
                let mut utf8 = [0u8; 4];
                out.extend_from_slice(other.encode_utf8(&mut utf8).as_bytes());
            }
            None => out.push(b'\\'),
        }
    }
    out
}
