//! Built-in option catalog of the tap test runner

use crate::option::{DefinitionError, OptionDefBuilder, Registry, RegistryBuilder, ValueType};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Reporter names accepted by `--reporter`
pub const REPORTERS: &[&str] = &[
    "classic",
    "doc",
    "dot",
    "dump",
    "json",
    "jsonstream",
    "landing",
    "list",
    "markdown",
    "min",
    "nyan",
    "progress",
    "silent",
    "spec",
    "tap",
    "xunit",
];

/// Coverage reporter names accepted by `--coverage-report`
pub const COVERAGE_REPORTERS: &[&str] = &[
    "clover",
    "cobertura",
    "html",
    "html-spa",
    "json",
    "json-summary",
    "lcov",
    "lcovonly",
    "none",
    "teamcity",
    "text",
    "text-lcov",
    "text-summary",
];

const USAGE: &str = "tap [options] <files>";

const HELP: &str = "Executes all the files and interprets their output as TAP \
    formatted test result data.\n\n\
    To parse TAP data from stdin, specify \"-\" as a filename.\n\n\
    Short options are parsed gnu-style, so for example '-bCRspec' would be \
    equivalent to '--bail --no-color --reporter=spec'\n\n\
    If the --check-coverage or --coverage-report options are provided, but no \
    test files are specified, then a coverage report or coverage check will be \
    run on the data from the last test run.\n\n\
    Coverage is never enabled for stdin.\n\n\
    Much more documentation available at: https://www.node-tap.org/";

const TEST_REGEX: &str = r"((\/|^)(tests?|__tests?__)\/.*|\.(test|spec))\.(mjs|[jt]sx?)$";
const TEST_IGNORE: &str = r"(\/|^)(node_modules|tap-snapshots)\/";

/// Host facts some defaults depend on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogContext {
    /// Available CPUs (at least 1)
    pub cpus: usize,
    pub stdout_is_tty: bool,
    /// Directory the default rc file lives in
    pub cwd: PathBuf,
}

impl CatalogContext {
    /// Read the context from the running process
    pub fn detect() -> std::io::Result<Self> {
        let cpus = std::thread::available_parallelism().map_or(1, |n| n.get());
        Ok(Self {
            cpus,
            stdout_is_tty: std::io::stdout().is_terminal(),
            cwd: std::env::current_dir()?,
        })
    }
}

/// Build the complete tap option registry
pub fn tap_registry(ctx: &CatalogContext) -> Result<Registry, DefinitionError> {
    let mut builder = Registry::builder();
    builder.usage(USAGE).help(HELP).rc_file_option("rcfile");

    basic_options(&mut builder, ctx)?;
    parallel_options(&mut builder, ctx)?;
    coverage_options(&mut builder)?;
    enforcement_options(&mut builder)?;
    other_options(&mut builder, ctx)?;
    environment_variables(&mut builder)?;

    builder.section(
        "Config Files",
        Some(
            "You can create a yaml file with any of the options above. By default, \
             the file at ./.taprc will be loaded, but the TAP_RCFILE environment \
             variable can modify this.\n\n\
             Run 'tap --dump-config' for a listing of what can be set in that file. \
             Each of the keys corresponds to one of the options above.",
        ),
    );

    builder.build()
}

fn define_all<const N: usize>(
    builder: &mut RegistryBuilder,
    defs: [OptionDefBuilder; N],
) -> Result<(), DefinitionError> {
    for def in defs {
        builder.define(def.build()?)?;
    }
    Ok(())
}

fn basic_options(builder: &mut RegistryBuilder, ctx: &CatalogContext) -> Result<(), DefinitionError> {
    builder.section("Basic Options", None);
    define_all(
        builder,
        [
            OptionDefBuilder::string("reporter")
                .short("R")
                .hint("type")
                .valid(REPORTERS.iter().copied())
                .description(
                    "Use the specified reporter. Defaults to 'classic' when colors \
                     are in use, or 'tap' when colors are disabled.",
                ),
            OptionDefBuilder::flag("bail")
                .short("b")
                .env_var("TAP_BAIL")
                .negate(Some("B"), "Do not bail out on first failure (default)")
                .description("Bail out on first failure"),
            OptionDefBuilder::flag("comments")
                .description("Print all tap comments to process.stderr"),
            OptionDefBuilder::flag("color")
                .short("c")
                .env_var("TAP_COLORS")
                .default(ctx.stdout_is_tty)
                .negate(Some("C"), "Do not use colors (Default for non-TTY)")
                .description("Use colors (Default for TTY)"),
            OptionDefBuilder::flag("snapshot")
                .short("S")
                .env_var("TAP_SNAPSHOT")
                .description("Set to generate snapshot files for 't.matchSnapshot()' assertions."),
            OptionDefBuilder::string("save")
                .short("s")
                .hint("file")
                .description(
                    "If <file> exists, then it should be a line-delimited list of test \
                     files to run. If <file> is not present, then all command-line \
                     positional arguments are run.\n\n\
                     After the set of test files are run, any failed test files are \
                     written back to the save file.\n\n\
                     This way, repeated runs with -s<file> will re-run failures until \
                     all the failures are passing, and then once again run all tests.",
                ),
            OptionDefBuilder::flag("only")
                .short("O")
                .env_var("TAP_ONLY")
                .description(
                    "Only run tests with {only: true} option, or created with \
                     t.only(...) function.",
                ),
            OptionDefBuilder::list("grep")
                .short("g")
                .hint("pattern")
                .env_var("TAP_GREP")
                .delimiter("\n")
                .description(
                    "Only run subtests tests matching the specified pattern.\n\n\
                     Patterns are matched against top-level subtests in each file. \
                     To filter tests at subsequent levels, specify this option \
                     multiple times.\n\n\
                     To specify regular expression flags, format pattern like a \
                     JavaScript RegExp literal. For example: '/xyz/i' for \
                     case-insensitive matching.",
                ),
            OptionDefBuilder::flag("invert")
                .short("i")
                .env_var("TAP_GREP_INVERT")
                .negate(Some("I"), "")
                .description("Invert the matches to --grep patterns. (Like grep -v)"),
            OptionDefBuilder::num("timeout")
                .short("t")
                .hint("n")
                .env_var("TAP_TIMEOUT")
                .default(30)
                .min(0.0)
                .description(
                    "Time out test files after <n> seconds. Defaults to 30, or the \
                     value of the TAP_TIMEOUT environment variable. Setting to 0 \
                     allows tests to run forever.",
                ),
            OptionDefBuilder::flag("no-timeout")
                .short("T")
                .alias(["--timeout=0"])
                .description("Do not time out tests."),
        ],
    )
}

fn parallel_options(
    builder: &mut RegistryBuilder,
    ctx: &CatalogContext,
) -> Result<(), DefinitionError> {
    builder.section(
        "Running Parallel Tests",
        Some(
            "Tap can run multiple test files in parallel. This generally results in \
             a speedier test run, but can also cause problems if your test files are \
             not designed to be independent from one another.\n\n\
             To designate a set of files as ok to run in parallel, add them to a \
             folder containing a file named 'tap-parallel-ok'.\n\n\
             To designate a set of files as not ok to run in parallel, add them to a \
             folder containing a file named 'tap-parallel-not-ok'.\n\n\
             These folders may be nested within one another, and tap will do the \
             right thing.",
        ),
    );
    let cpus = ctx.cpus.max(1);
    define_all(
        builder,
        [
            OptionDefBuilder::num("jobs")
                .short("j")
                .hint("n")
                .min(1.0)
                .default(cpus.min(8) as f64)
                .description(
                    "Run up to <n> test files in parallel.\n\n\
                     By default, this will be set to the number of CPUs on the \
                     system.\n\n\
                     Set --jobs=1 to disable parallelization entirely.",
                ),
            OptionDefBuilder::flag("jobs-auto")
                .short("J")
                .alias([format!("--jobs={cpus}")])
                .description(
                    "Run test files in parallel (auto calculated)\n\n\
                     This is the default, so this option serves little purpose except \
                     to re-set the parallelization back to the default if an early \
                     option set it differently.",
                ),
        ],
    )
}

fn coverage_options(builder: &mut RegistryBuilder) -> Result<(), DefinitionError> {
    builder.section(
        "Code Coverage Options",
        Some(
            "Tap uses the nyc module internally to provide code coverage, so there is \
             no need to invoke nyc yourself or depend on it directly unless you want \
             to use it in other scenarios.",
        ),
    );
    define_all(
        builder,
        [
            OptionDefBuilder::flag("100")
                .alias([
                    "--branches=100",
                    "--lines=100",
                    "--functions=100",
                    "--statements=100",
                ])
                .description(
                    "Enforce full coverage, 100%. Sets branches, statements, \
                     functions, and lines to 100.\n\n\
                     This is the default. To specify a lower limit (or no limit) set \
                     --lines, --branches, --functions, or --statements to a lower \
                     number than 100, or disable coverage checking with \
                     --no-check-coverage, or disable coverage entirely with \
                     --no-coverage.",
                ),
            OptionDefBuilder::flag("coverage")
                .short("cov")
                .default(true)
                .negate(
                    Some("no-cov"),
                    "Do not capture coverage information. Note that if nyc is already \
                     loaded, then the coverage info will still be captured.",
                )
                .description(
                    "Capture coverage information using 'nyc'. This is enabled by \
                     default.\n\n\
                     If a COVERALLS_REPO_TOKEN environment variable is set, then \
                     coverage is sent to the coveralls.io service.",
                ),
            OptionDefBuilder::string("coverage-report")
                .hint("type")
                .valid(COVERAGE_REPORTERS.iter().copied())
                .description(
                    "Output coverage information using the specified istanbul/nyc \
                     reporter type.\n\n\
                     Default is 'text' when running on the command line, or \
                     'text-lcov' when piping to coveralls.\n\n\
                     If 'html' is used, then the report will be opened in a web \
                     browser after running.\n\n\
                     This can be run on its own at any time after a test run that \
                     included coverage.",
                ),
            OptionDefBuilder::flag("no-coverage-report").description(
                "Do not output a coverage report, even if coverage information is generated.",
            ),
            OptionDefBuilder::flag("browser")
                .default(true)
                .negate(
                    None,
                    "Do not open a web browser after generating an html coverage report",
                )
                .description(
                    "Open a browser when an html coverage report is generated. \
                     (this is the default behavior)",
                ),
            OptionDefBuilder::flag("show-process-tree")
                .short("pstree")
                .implies("coverage", true)
                .description("Enable coverage and display the tree of spawned processes."),
        ],
    )
}

fn enforcement_options(builder: &mut RegistryBuilder) -> Result<(), DefinitionError> {
    builder.section(
        "Coverage Enforcement Options",
        Some(
            "These options enable you to specify that the test will fail if a given \
             coverage level is not met. Setting any of the options below will trigger \
             the --coverage and --check-coverage flags.\n\n\
             The most stringent is --100. You can find a list of projects running \
             their tests like this at: https://www.node-tap.org/100",
        ),
    );
    builder.define(
        OptionDefBuilder::flag("check-coverage")
            .implies("coverage", true)
            .description(
                "Check whether coverage is within thresholds provided. Setting this \
                 explicitly will default --coverage to true.\n\n\
                 This can be run on its own any time after a test run that included \
                 coverage.",
            )
            .build()?,
    )?;
    for metric in ["branches", "functions", "lines", "statements"] {
        builder.define(
            OptionDefBuilder::num(metric)
                .hint("n")
                .min(0.0)
                .max(100.0)
                .default(100)
                .implies("check-coverage", true)
                .implies("coverage", true)
                .description(&format!("what % of {metric} must be covered?"))
                .build()?,
        )?;
    }
    Ok(())
}

fn other_options(builder: &mut RegistryBuilder, ctx: &CatalogContext) -> Result<(), DefinitionError> {
    builder.section("Other Options", None);
    let node_alias = |name: &str, description: &str| {
        OptionDefBuilder::flag(name)
            .alias([format!("--node-arg=--{name}")])
            .description(description)
    };
    let rcfile = ctx.cwd.join(".taprc");

    define_all(
        builder,
        [
            OptionDefBuilder::flag("help")
                .short("h")
                .description("Show this helpful output"),
            OptionDefBuilder::flag("version")
                .short("v")
                .description("Show the version of this program."),
            OptionDefBuilder::string("test-regex")
                .hint("pattern")
                .default(TEST_REGEX)
                .description(
                    "A regular expression pattern indicating tests to run if no \
                     positional arguments are provided.\n\n\
                     By default, tap will search for all files ending in .ts, .js, or \
                     .mjs, in a top-level folder named test, tests, or __tests__, or \
                     any file ending in .spec. or .test. before a js, mjs, or ts \
                     extension.",
                ),
            OptionDefBuilder::string("test-ignore")
                .hint("pattern")
                .default(TEST_IGNORE)
                .description(
                    "When no positional arguments are provided, use the supplied \
                     regular expression pattern to exclude tests that would otherwise \
                     be matched by the test-regex. The default excludes dependencies \
                     and tap-generated snapshots.",
                ),
            OptionDefBuilder::list("test-arg").hint("arg").description(
                "Pass an argument to test files spawned by the tap command line \
                 executable. This can be specified multiple times to pass multiple \
                 args to test scripts.",
            ),
            OptionDefBuilder::list("nyc-arg").hint("arg").description(
                "Pass an argument to nyc when running child processes with coverage \
                 enabled. This can be specified multiple times to pass multiple args \
                 to nyc.",
            ),
            OptionDefBuilder::list("node-arg").hint("arg").description(
                "Pass an argument to Node binary in all child processes. Run 'node \
                 --help' to see a list of all relevant arguments. This can be \
                 specified multiple times to pass multiple args to Node.",
            ),
            node_alias("expose-gc", "Expose the gc() function to Node.js tests").short("gc"),
            node_alias("debug-brk", "Run JavaScript tests with node --debug-brk"),
            node_alias("harmony", "Enable all Harmony flags in JavaScript tests"),
            node_alias("strict", "Run JS tests in 'use strict' mode"),
            OptionDefBuilder::flag("esm").default(true).description(
                "Run .js and .mjs with support for EcmaScript modules (Default: true)",
            ),
            OptionDefBuilder::flag("nyc-help")
                .description("Print nyc usage banner. Useful for viewing options for --nyc-arg."),
            OptionDefBuilder::flag("nyc-version").description("Print version of nyc used by tap."),
            OptionDefBuilder::flag("parser-version")
                .description("Print the version of tap-parser used by tap."),
            OptionDefBuilder::flag("versions")
                .description("Print versions of tap, nyc, and tap-parser"),
            OptionDefBuilder::flag("dump-config")
                .description("Dump the config options in YAML format"),
            OptionDefBuilder::string("rcfile")
                .hint("file")
                .env_var("TAP_RCFILE")
                .default(rcfile.to_string_lossy().into_owned())
                .description(
                    "Load any of these configurations from a YAML-formatted file at \
                     the path specified. Defaults to .taprc in the current working \
                     directory.\n\n\
                     Run 'tap --dump-config' to see available options and formatting.",
                ),
            OptionDefBuilder::string("output-file")
                .short("o")
                .hint("file")
                .description(
                    "Send the raw TAP output to the specified file. Reporter output \
                     will still be printed to stdout, but the file will contain the \
                     raw TAP for later replay or analysis.",
                ),
            OptionDefBuilder::flag("debug")
                .env_var("TAP_DEBUG")
                .description("Turn on debug mode"),
        ],
    )?;
    builder.help_entry(
        "--",
        "Stop parsing flags, and treat any additional command line arguments as filenames.",
    );
    Ok(())
}

fn environment_variables(builder: &mut RegistryBuilder) -> Result<(), DefinitionError> {
    use ValueType::{Flag, List, Num, Str};

    builder.section("Environment Variables", None);
    define_all(
        builder,
        [
            OptionDefBuilder::env("COVERALLS_REPO_TOKEN", Str)
                .implies("coverage", true)
                .description(
                    "Set to a Coveralls token to automatically send coverage \
                     information to https://coveralls.io",
                ),
            OptionDefBuilder::env("TAP_CHILD_ID", Num).description(
                "Test files have this value set to a numeric value when run through \
                 the test runner. It also appears on the root tap object as \
                 `tap.childId`.",
            ),
            OptionDefBuilder::env("TAP_SNAPSHOT", Flag).description(
                "Set to '1' to generate snapshot files for 't.matchSnapshot()' assertions.",
            ),
            OptionDefBuilder::env("TAP_RCFILE", Str).description(
                "A yaml formatted file which can set any of the above options. \
                 Defaults to ./.taprc",
            ),
            OptionDefBuilder::env("TAP_TIMEOUT", Num)
                .min(0.0)
                .default(30)
                .description("Default value for --timeout option."),
            OptionDefBuilder::env("TAP_COLORS", Flag).description(
                "Set to '1' to force color output, or '0' to prevent color output.",
            ),
            OptionDefBuilder::env("TAP_BAIL", Flag).description(
                "Bail out on the first test failure. Used internally when '--bailout' \
                 is set.",
            ),
            OptionDefBuilder::env("TAP", Flag)
                .implies("reporter", "tap")
                .description(
                    "Set to '1' to force standard TAP output, and suppress any \
                     reporters. Used when running child tests so that their output is \
                     parseable by the test harness.",
                ),
            OptionDefBuilder::env("TAP_DIAG", Flag).description(
                "Set to '1' to show diagnostics by default for passing tests. Set to \
                 '0' to NOT show diagnostics by default for failing tests. If not one \
                 of these two values, then diagnostics are printed by default for \
                 failing tests, and not for passing tests.",
            ),
            OptionDefBuilder::env("TAP_BUFFER", Flag)
                .description("Set to '1' to run subtests in buffered mode by default."),
            OptionDefBuilder::env("TAP_DEV_LONGSTACK", Flag).description(
                "Set to '1' to include node-tap internals in stack traces. By \
                 default, these are included only when the current working directory \
                 is the tap project itself. Note that node internals are always \
                 excluded.",
            ),
            OptionDefBuilder::env("TAP_DEV_SHORTSTACK", Flag).description(
                "Set to '1' to exclude node-tap internals in stack traces, even if \
                 the current working directory is the tap project itself.",
            ),
            OptionDefBuilder::env("TAP_DEBUG", Flag)
                .description("Set to '1' to turn on debug mode."),
            OptionDefBuilder::env("NODE_DEBUG", Str)
                .description("Include 'tap' to turn on debug mode."),
            OptionDefBuilder::env("TAP_GREP", List)
                .delimiter("\n")
                .description(
                    "A '\\n'-delimited list of grep patterns to apply to root level \
                     test objects. (This is an implementation detail for how the \
                     '--grep' option works.)",
                ),
            OptionDefBuilder::env("TAP_GREP_INVERT", Flag).description(
                "Set to '1' to invert the meaning of the patterns in TAP_GREP. \
                 (Implementation detail for how the '--invert' flag works.)",
            ),
            OptionDefBuilder::env("TAP_ONLY", Flag)
                .description("Set to '1' to set the --only flag"),
            OptionDefBuilder::env("TAP_NO_ESM", Flag)
                .implies("esm", false)
                .description("Set to '1' to disable automatic esm support"),
            OptionDefBuilder::env("_TAP_COVERAGE_", Flag)
                .description("Reserved for internal use."),
        ],
    )
}
