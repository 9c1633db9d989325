//! External command descriptions for git and the CK analyzer.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// A program plus the leading arguments it is always invoked with.
///
/// Call sites append their own arguments after `args`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandSpec {
    /// Program name or path.
    pub program: String,

    /// Arguments placed before the call-site arguments.
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Creates a command with no leading arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Adds a leading argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// How the CK analyzer is launched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AnalyzerCommand {
    /// `java -jar <jar> <source> <output>`.
    Jar {
        /// Java launcher.
        #[serde(default = "default_java")]
        java: String,
        /// Path to the CK jar.
        jar: PathBuf,
    },

    /// Arbitrary program; source and output directories are appended.
    Program {
        /// Program name or path.
        program: String,
        /// Leading arguments.
        #[serde(default)]
        args: Vec<String>,
    },
}

fn default_java() -> String {
    "java".to_string()
}

impl Default for AnalyzerCommand {
    fn default() -> Self {
        Self::Jar {
            java: default_java(),
            jar: PathBuf::from("ck.jar"),
        }
    }
}

impl AnalyzerCommand {
    /// Returns the command line prefix used to launch the analyzer.
    pub fn command_spec(&self) -> CommandSpec {
        match self {
            Self::Jar { java, jar } => CommandSpec::new(java.clone())
                .arg("-jar")
                .arg(jar.display().to_string()),
            Self::Program { program, args } => CommandSpec {
                program: program.clone(),
                args: args.clone(),
            },
        }
    }

    /// File that must exist before a run can start, if any.
    ///
    /// Bare program names are resolved through `PATH` at spawn time and are
    /// not checked here.
    pub fn entry_point(&self) -> Option<&Path> {
        match self {
            Self::Jar { jar, .. } => Some(jar),
            Self::Program { program, .. } => {
                let path = Path::new(program);
                (path.components().count() > 1).then_some(path)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jar_command_expands_to_java_invocation() {
        let spec = AnalyzerCommand::default().command_spec();
        assert_eq!(spec.program, "java");
        assert_eq!(spec.args, vec!["-jar".to_string(), "ck.jar".to_string()]);
    }

    #[test]
    fn bare_program_has_no_entry_point() {
        let command = AnalyzerCommand::Program {
            program: "ck".to_string(),
            args: Vec::new(),
        };
        assert!(command.entry_point().is_none());

        let command = AnalyzerCommand::Program {
            program: "/opt/ck/bin/ck".to_string(),
            args: Vec::new(),
        };
        assert_eq!(command.entry_point(), Some(Path::new("/opt/ck/bin/ck")));
    }
}
