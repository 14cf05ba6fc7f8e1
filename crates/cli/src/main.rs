use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dexlens::commands::{
    aidl_classes_command, aidl_impl_command, aidl_methods_command, class_list_command,
    class_name_command, class_source_command, classes_command, config_command, convert_command,
    dialect_command, info_command, list_providers_command, manifest_command, member_list_command,
    method_source_command, search_command, superclass_command, ClassListKind, MemberListKind,
};
use dexlens::init_logging;

/// Signature conversion and AIDL resolution over decompiled Android programs.
///
/// Every command loads its `--input` fresh; nothing is kept between runs.
#[derive(Parser, Debug)]
#[command(
    name = "dexlens",
    version,
    about = "Signature conversion and AIDL resolution over decompiled programs",
    long_about = None
)]
struct Cli {
    /// Log filter used when RUST_LOG is not set (e.g. warn, info, dexlens_core=debug).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

/// Where to load the program from.
#[derive(Args, Debug)]
struct ProgramArgs {
    /// Program input: a model file, or a directory of model files.
    #[arg(long)]
    input: String,

    /// Provider to load with. Defaults to DEXLENS_PROVIDER or `snapshot`.
    #[arg(long)]
    provider: Option<String>,

    /// Emit JSON instead of human-readable text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a class descriptor, method reference or field reference to the source dialect.
    ///
    /// Source-dialect input is printed unchanged.
    Convert {
        identifier: String,
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print the class that owns an identifier (either dialect).
    ClassName {
        identifier: String,
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Report the inferred dialect and kind of an identifier.
    Dialect {
        identifier: String,
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show a summary of the loaded program.
    Info {
        #[command(flatten)]
        program: ProgramArgs,
    },

    /// List every class, including nested classes.
    Classes {
        #[command(flatten)]
        program: ProgramArgs,
    },

    /// Print the AndroidManifest.xml captured with the program.
    Manifest {
        #[command(flatten)]
        program: ProgramArgs,
    },

    /// Print the reconstructed source of a class.
    ClassSource {
        #[command(flatten)]
        program: ProgramArgs,
        #[arg(long)]
        class: String,
    },

    /// Print the reconstructed source of a method.
    MethodSource {
        #[command(flatten)]
        program: ProgramArgs,
        /// Owning class; derived from the method signature when omitted.
        #[arg(long)]
        class: Option<String>,
        /// Method signature, e.g. `com.example.Foo.bar(int):void` or `Lcom/example/Foo;->bar(I)V`.
        #[arg(long)]
        method: String,
    },

    /// Print the superclass of a class.
    Superclass {
        #[command(flatten)]
        program: ProgramArgs,
        #[arg(long)]
        class: String,
    },

    /// List the interfaces a class declares.
    Interfaces {
        #[command(flatten)]
        program: ProgramArgs,
        #[arg(long)]
        class: String,
    },

    /// List the methods of a class.
    Methods {
        #[command(flatten)]
        program: ProgramArgs,
        #[arg(long)]
        class: String,
    },

    /// List the fields of a class.
    Fields {
        #[command(flatten)]
        program: ProgramArgs,
        #[arg(long)]
        class: String,
    },

    /// List symbols that reference a class.
    ClassCallers {
        #[command(flatten)]
        program: ProgramArgs,
        #[arg(long)]
        class: String,
    },

    /// List symbols that call a method.
    MethodCallers {
        #[command(flatten)]
        program: ProgramArgs,
        #[arg(long)]
        class: Option<String>,
        #[arg(long)]
        method: String,
    },

    /// List methods related to a method by overriding.
    MethodOverrides {
        #[command(flatten)]
        program: ProgramArgs,
        #[arg(long)]
        class: Option<String>,
        #[arg(long)]
        method: String,
    },

    /// List symbols that access a field.
    FieldCallers {
        #[command(flatten)]
        program: ProgramArgs,
        #[arg(long)]
        class: Option<String>,
        /// Field signature, e.g. `com.example.Foo.count :int` or `Lcom/example/Foo;->count:I`.
        #[arg(long)]
        field: String,
    },

    /// Find methods whose reconstructed source contains a string.
    Search {
        #[command(flatten)]
        program: ProgramArgs,
        #[arg(long)]
        text: String,
    },

    /// List every AIDL interface and its implementation.
    AidlClasses {
        #[command(flatten)]
        program: ProgramArgs,
    },

    /// List the methods of an AIDL interface.
    AidlMethods {
        #[command(flatten)]
        program: ProgramArgs,
        #[arg(long)]
        class: String,
    },

    /// Print the class implementing an AIDL interface.
    AidlImpl {
        #[command(flatten)]
        program: ProgramArgs,
        #[arg(long)]
        class: String,
        /// Re-run detection and resolution instead of using a cached result.
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// List available program providers.
    Providers {
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show configuration read from the environment.
    Config {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Command::Convert { identifier, json } => convert_command(&identifier, json)?,
        Command::ClassName { identifier, json } => class_name_command(&identifier, json)?,
        Command::Dialect { identifier, json } => dialect_command(&identifier, json)?,
        Command::Info { program } => info_command(&program.input, provider(&program), program.json)?,
        Command::Classes { program } => {
            classes_command(&program.input, provider(&program), program.json)?
        }
        Command::Manifest { program } => {
            manifest_command(&program.input, provider(&program), program.json)?
        }
        Command::ClassSource { program, class } => {
            class_source_command(&program.input, provider(&program), &class, program.json)?
        }
        Command::MethodSource { program, class, method } => method_source_command(
            &program.input,
            provider(&program),
            class.as_deref(),
            &method,
            program.json,
        )?,
        Command::Superclass { program, class } => {
            superclass_command(&program.input, provider(&program), &class, program.json)?
        }
        Command::Interfaces { program, class } => {
            class_list(&program, &class, ClassListKind::Interfaces)?
        }
        Command::Methods { program, class } => class_list(&program, &class, ClassListKind::Methods)?,
        Command::Fields { program, class } => class_list(&program, &class, ClassListKind::Fields)?,
        Command::ClassCallers { program, class } => {
            class_list(&program, &class, ClassListKind::Callers)?
        }
        Command::MethodCallers { program, class, method } => {
            member_list(&program, class.as_deref(), &method, MemberListKind::MethodCallers)?
        }
        Command::MethodOverrides { program, class, method } => {
            member_list(&program, class.as_deref(), &method, MemberListKind::MethodOverrides)?
        }
        Command::FieldCallers { program, class, field } => {
            member_list(&program, class.as_deref(), &field, MemberListKind::FieldCallers)?
        }
        Command::Search { program, text } => {
            search_command(&program.input, provider(&program), &text, program.json)?
        }
        Command::AidlClasses { program } => {
            aidl_classes_command(&program.input, provider(&program), program.json)?
        }
        Command::AidlMethods { program, class } => {
            aidl_methods_command(&program.input, provider(&program), &class, program.json)?
        }
        Command::AidlImpl { program, class, force } => {
            aidl_impl_command(&program.input, provider(&program), &class, force, program.json)?
        }
        Command::Providers { json } => list_providers_command(json)?,
        Command::Config { json } => config_command(json)?,
    }

    Ok(())
}

fn provider(program: &ProgramArgs) -> Option<&str> {
    program.provider.as_deref()
}

fn class_list(program: &ProgramArgs, class: &str, kind: ClassListKind) -> Result<()> {
    class_list_command(&program.input, provider(program), class, kind, program.json)
}

fn member_list(
    program: &ProgramArgs,
    class: Option<&str>,
    member: &str,
    kind: MemberListKind,
) -> Result<()> {
    member_list_command(&program.input, provider(program), class, member, kind, program.json)
}
