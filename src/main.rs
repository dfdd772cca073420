use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use inkwell::context::Context;

use dal::diagnostics;
use dal::llvm_codegen::{BuildMode, Codegen, CodegenOptions, OutType};
use dal::CompileError;

#[derive(Parser)]
#[command(name = "dal")]
#[command(about = "Compiler for the Dal programming language")]
#[command(disable_version_flag = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a source file
    Build(BuildArgs),
    /// Print the compiler version
    Version,
    /// Print the license
    License,
}

#[derive(Args)]
struct BuildArgs {
    /// Entry source file
    #[arg(long)]
    input: PathBuf,

    /// Output kind
    #[arg(long = "type", value_enum, default_value_t = OutTypeOpt::Exe)]
    out_type: OutTypeOpt,

    /// Output path
    #[arg(long, default_value = "a.out")]
    output: PathBuf,

    /// Extra tracing
    #[arg(long)]
    verbose: bool,

    /// Statically link the output
    #[arg(long = "static")]
    static_link: bool,

    /// Strip debug symbols
    #[arg(long)]
    strip: bool,

    /// Optimize aggressively
    #[arg(long)]
    release: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutTypeOpt {
    Exe,
    Lib,
    Obj,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    match cli.command {
        Command::Build(args) => build(args),
        Command::Version => {
            println!("dal {}", dal::DAL_VERSION);
            ExitCode::SUCCESS
        }
        Command::License => {
            println!("{LICENSE}");
            ExitCode::SUCCESS
        }
    }
}

fn build(args: BuildArgs) -> ExitCode {
    let root_dir = args
        .input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let options = CodegenOptions {
        root_dir,
        build_mode: if args.release {
            BuildMode::Release
        } else {
            BuildMode::Debug
        },
        out_type: match args.out_type {
            OutTypeOpt::Exe => OutType::Exe,
            OutTypeOpt::Lib => OutType::Lib,
            OutTypeOpt::Obj => OutType::Obj,
        },
        out_path: args.output,
        static_link: args.static_link,
        strip_symbols: args.strip,
        verbose: args.verbose,
    };

    let context = Context::create();
    let mut cg = match Codegen::new(&context, options) {
        Ok(cg) => cg,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cg.generate(&args.input) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CompileError::Diagnostics(diags)) => {
            diagnostics::render_all(&diags);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

const LICENSE: &str = "\
MIT License

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the \"Software\"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.";
