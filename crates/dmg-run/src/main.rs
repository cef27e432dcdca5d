//! CLI entry point for the DMG-class CPU runner.

use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;

use dmg_core::{
    disassemble_range, Bus, CoreConfig, Cpu, RomImage, RunBoundary, TraceEvent, TraceSink,
};
#[cfg(test)]
use tempfile as _;

const USAGE_TEXT: &str = "\
Usage: dmg-run <rom> [options]

Options:
  -q, --quiet          Do not print the per-instruction trace
  -n, --max-steps <N>  Stop after N retired instructions
  -h, --help           Show this help message

Exit status:
  0  the program halted, stopped, or reached the step limit
  1  execution faulted (a diagnostic dump is written to stderr)
  2  usage or ROM loading error

Examples:
  dmg-run tetris.gb
  dmg-run tetris.gb --quiet --max-steps 100000
";

/// Rows of disassembly printed after a fault dump.
const FAULT_CONTEXT_ROWS: usize = 4;

const EXIT_OK: i32 = 0;
const EXIT_FAULT: i32 = 1;
const EXIT_USAGE: i32 = 2;

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    rom: PathBuf,
    quiet: bool,
    max_steps: Option<u64>,
}

#[derive(Debug)]
enum ParseResult {
    Run(RunArgs),
    Help,
}

#[allow(clippy::while_let_on_iterator)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut rom: Option<PathBuf> = None;
    let mut quiet = false;
    let mut max_steps = None;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(ParseResult::Help);
        }

        if arg == "--quiet" || arg == "-q" {
            quiet = true;
            continue;
        }

        if arg == "--max-steps" || arg == "-n" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --max-steps".to_string())?;
            let value = value.to_string_lossy();
            let steps = value
                .parse::<u64>()
                .map_err(|_| format!("invalid step count: {value}"))?;
            max_steps = Some(steps);
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if rom.is_some() {
            return Err("multiple ROM paths provided".to_string());
        }
        rom = Some(PathBuf::from(arg));
    }

    let rom = rom.ok_or_else(|| "missing ROM path".to_string())?;
    Ok(ParseResult::Run(RunArgs {
        rom,
        quiet,
        max_steps,
    }))
}

/// Prints instruction-start rows; other events are left to the final summary.
///
/// The first write failure is kept and later rows are dropped, so a closed
/// pipe surfaces once the run returns.
struct WriterTraceSink<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> WriterTraceSink<W> {
    const fn new(out: W) -> Self {
        Self { out, error: None }
    }
}

impl<W: Write> TraceSink for WriterTraceSink<W> {
    fn on_event(&mut self, event: TraceEvent) {
        if self.error.is_some() || !matches!(event, TraceEvent::InstructionStart(_)) {
            return;
        }
        if let Err(e) = writeln!(self.out, "{event}") {
            self.error = Some(e);
        }
    }
}

fn run(args: &RunArgs, out: &mut impl Write, err: &mut impl Write) -> io::Result<i32> {
    let rom = match RomImage::from_file(&args.rom) {
        Ok(rom) => rom,
        Err(e) => {
            writeln!(err, "error: {e}")?;
            return Ok(EXIT_USAGE);
        }
    };

    writeln!(out, "Loaded {} ({} bytes)", display_title(&rom), rom.bytes().len())?;

    let config = CoreConfig {
        tracing_enabled: !args.quiet,
        step_limit: args.max_steps,
    };
    let mut cpu = Cpu::new(Bus::with_dmg_layout(rom), config);
    let mut sink = WriterTraceSink::new(&mut *out);
    let result = cpu.begin_execution(&mut sink);
    if let Some(e) = sink.error.take() {
        return Err(e);
    }

    match result {
        Ok(outcome) => {
            let reason = match outcome.boundary {
                RunBoundary::ModeChanged(mode) => mode.name(),
                RunBoundary::StepLimit => "step limit",
            };
            writeln!(
                out,
                "Stopped ({reason}) after {} instructions, {} cycles",
                outcome.steps, outcome.cycles
            )?;
            Ok(EXIT_OK)
        }
        Err(report) => {
            writeln!(err, "error: {report}")?;
            let rows = disassemble_range(cpu.bus(), report.registers.pc(), FAULT_CONTEXT_ROWS);
            if !rows.is_empty() {
                writeln!(err, "Code at PC:")?;
                for row in rows {
                    writeln!(err, "  {row}")?;
                }
            }
            Ok(EXIT_FAULT)
        }
    }
}

fn display_title(rom: &RomImage) -> &str {
    if rom.title().is_empty() {
        "<untitled>"
    } else {
        rom.title()
    }
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            EXIT_OK
        }
        Ok(ParseResult::Run(args)) => {
            let stdout = io::stdout();
            let stderr = io::stderr();
            match run(&args, &mut stdout.lock(), &mut stderr.lock()) {
                Ok(code) => code,
                Err(e) => {
                    eprintln!("error: failed to write output: {e}");
                    EXIT_FAULT
                }
            }
        }
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            EXIT_USAGE
        }
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmg_core::header_checksum;
    use dmg_core::rom::{HEADER_CHECKSUM_OFFSET, LOGO_OFFSET, NINTENDO_LOGO, TITLE_OFFSET};
    use std::ffi::OsString;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn os_args(args: &[&str]) -> impl Iterator<Item = OsString> {
        args.iter()
            .map(OsString::from)
            .collect::<Vec<_>>()
            .into_iter()
    }

    fn write_cartridge(program: &[u8]) -> NamedTempFile {
        let mut data = vec![0x00; 0x8000];
        data[LOGO_OFFSET..LOGO_OFFSET + NINTENDO_LOGO.len()].copy_from_slice(&NINTENDO_LOGO);
        data[TITLE_OFFSET..TITLE_OFFSET + 4].copy_from_slice(b"DEMO");
        data[0x0100..0x0100 + program.len()].copy_from_slice(program);
        data[HEADER_CHECKSUM_OFFSET] = header_checksum(&data).expect("header present");

        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(&data).expect("write ROM");
        file
    }

    fn run_file(
        file: &NamedTempFile,
        quiet: bool,
        max_steps: Option<u64>,
    ) -> (i32, String, String) {
        let args = RunArgs {
            rom: file.path().to_path_buf(),
            quiet,
            max_steps,
        };
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(&args, &mut out, &mut err).expect("in-memory writers");
        (
            code,
            String::from_utf8(out).expect("utf-8 output"),
            String::from_utf8(err).expect("utf-8 output"),
        )
    }

    #[test]
    fn parses_rom_and_flags() {
        let result = parse_args(os_args(&["game.gb", "--quiet", "--max-steps", "500"]))
            .expect("valid args should parse");

        let ParseResult::Run(args) = result else {
            panic!("expected run arguments");
        };
        assert_eq!(
            args,
            RunArgs {
                rom: PathBuf::from("game.gb"),
                quiet: true,
                max_steps: Some(500),
            }
        );
    }

    #[test]
    fn parses_help_flag() {
        let result = parse_args(os_args(&["-h"])).expect("help should parse");
        assert!(matches!(result, ParseResult::Help));
    }

    #[test]
    fn rejects_bad_arguments() {
        let cases: [(&[&str], &str); 5] = [
            (&[], "missing ROM path"),
            (&["a.gb", "b.gb"], "multiple ROM paths"),
            (&["a.gb", "--verbose"], "unknown option"),
            (&["a.gb", "--max-steps"], "missing value"),
            (&["a.gb", "-n", "many"], "invalid step count"),
        ];
        for (args, expected) in cases {
            let error = parse_args(os_args(args)).expect_err("should fail parse");
            assert!(error.contains(expected), "{error}");
        }
    }

    #[test]
    fn traces_and_exits_cleanly_on_halt() {
        // ld bc,0x1234; halt
        let file = write_cartridge(&[0x01, 0x34, 0x12, 0x76]);
        let (code, out, err) = run_file(&file, false, None);

        assert_eq!(code, EXIT_OK);
        assert!(err.is_empty());
        assert!(out.starts_with("Loaded DEMO (32768 bytes)\n"));
        assert!(out.contains("0100: 01 34 12 (ld bc,imm16)\n"));
        assert!(out.contains("0103: 76 (halt)\n"));
        assert!(out.contains("Stopped (halted) after 2 instructions, 16 cycles"));
    }

    #[test]
    fn quiet_run_honors_step_limit() {
        // jr -2
        let file = write_cartridge(&[0x18, 0xFE]);
        let (code, out, _) = run_file(&file, true, Some(3));

        assert_eq!(code, EXIT_OK);
        assert!(!out.contains("(jr e8)"));
        assert!(out.contains("Stopped (step limit) after 3 instructions, 36 cycles"));
    }

    #[test]
    fn fault_writes_dump_and_exits_with_one() {
        // nop; <undefined>
        let file = write_cartridge(&[0x00, 0xDD]);
        let (code, _, err) = run_file(&file, true, None);

        assert_eq!(code, EXIT_FAULT);
        assert!(err.contains("Ran 1 instructions"), "{err}");
        assert!(err.contains("Code at PC:"));
        assert!(err.contains("0101: DD (unimplemented)"), "{err}");
    }

    /// Accepts `lines` complete lines, then fails every write with a broken pipe.
    struct ClosedPipe {
        lines: usize,
        rejected: usize,
    }

    impl ClosedPipe {
        const fn after(lines: usize) -> Self {
            Self { lines, rejected: 0 }
        }
    }

    impl Write for ClosedPipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.lines == 0 {
                self.rejected += 1;
                return Err(io::Error::from(io::ErrorKind::BrokenPipe));
            }
            let newlines = buf.iter().filter(|&&byte| byte == b'\n').count();
            self.lines = self.lines.saturating_sub(newlines);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn trace_write_failure_is_reported() {
        // jr -2
        let file = write_cartridge(&[0x18, 0xFE]);
        let args = RunArgs {
            rom: file.path().to_path_buf(),
            quiet: false,
            max_steps: Some(10),
        };
        let mut out = ClosedPipe::after(1);
        let mut err = Vec::new();

        let error = run(&args, &mut out, &mut err).expect_err("trace output fails");
        assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(out.rejected, 1);
        assert!(err.is_empty());
    }

    #[test]
    fn trace_sink_stops_writing_after_first_failure() {
        let rom = dmg_core::RomDevice::from_bytes(vec![0x00; 0x8000]);
        let config = CoreConfig {
            tracing_enabled: true,
            step_limit: Some(3),
        };
        let mut cpu = Cpu::new(Bus::with_rom_device(rom), config);
        let mut sink = WriterTraceSink::new(ClosedPipe::after(0));

        let outcome = cpu.begin_execution(&mut sink).expect("nops retire");
        assert_eq!(outcome.steps, 3);
        assert_eq!(sink.error.map(|e| e.kind()), Some(io::ErrorKind::BrokenPipe));
        assert_eq!(sink.out.rejected, 1);
    }

    #[test]
    fn invalid_rom_exits_with_two() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(&[0x00; 0x200]).expect("write ROM");

        let (code, out, err) = run_file(&file, false, None);
        assert_eq!(code, EXIT_USAGE);
        assert!(out.is_empty());
        assert!(err.contains("logo"));
    }
}
