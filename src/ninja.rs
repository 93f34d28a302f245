//! Ninja syntax writer.
//!
//! A thin serializer for the subset of the ninja build language the
//! generator needs: comments, variables, rules, build edges, phony
//! aggregates, and a default declaration. The writer is deliberately dumb:
//! it emits lines in call order, so definition-before-use is the caller's
//! contract, and values are written raw because callers intentionally
//! embed `$variable` references (ninja expands `$$` to a literal `$`).

use std::io::{self, Write};

/// A rule declaration. Built with chained setters, written via
/// [`NinjaWriter::rule`].
#[derive(Debug, Clone)]
pub struct Rule<'a> {
    name: &'a str,
    command: &'a str,
    deps: Option<&'a str>,
    depfile: Option<&'a str>,
}

impl<'a> Rule<'a> {
    pub fn new(name: &'a str, command: &'a str) -> Self {
        Rule {
            name,
            command,
            deps: None,
            depfile: None,
        }
    }

    /// Dependency-file style (`gcc` or `msvc`), for header tracking.
    pub fn deps(mut self, deps: &'a str) -> Self {
        self.deps = Some(deps);
        self
    }

    /// Where the toolchain writes the dependency file.
    pub fn depfile(mut self, depfile: &'a str) -> Self {
        self.depfile = Some(depfile);
        self
    }
}

/// Streaming writer over any byte sink.
pub struct NinjaWriter<W: Write> {
    out: W,
}

impl<W: Write> NinjaWriter<W> {
    pub fn new(out: W) -> Self {
        NinjaWriter { out }
    }

    pub fn comment(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "# {}", text)
    }

    pub fn newline(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    /// Top-level variable binding. An empty value still declares the
    /// variable (`key =`), which ninja reads as the empty string.
    pub fn variable(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.binding(0, key, value)
    }

    pub fn rule(&mut self, rule: &Rule<'_>) -> io::Result<()> {
        writeln!(self.out, "rule {}", rule.name)?;
        self.binding(1, "command", rule.command)?;
        if let Some(deps) = rule.deps {
            self.binding(1, "deps", deps)?;
        }
        if let Some(depfile) = rule.depfile {
            self.binding(1, "depfile", depfile)?;
        }
        Ok(())
    }

    /// Build edge with optional per-edge variable bindings.
    pub fn build(
        &mut self,
        outputs: &[&str],
        rule: &str,
        inputs: &[&str],
        variables: &[(&str, &str)],
    ) -> io::Result<()> {
        write!(self.out, "build {}: {}", outputs.join(" "), rule)?;
        if !inputs.is_empty() {
            write!(self.out, " {}", inputs.join(" "))?;
        }
        writeln!(self.out)?;
        for (key, value) in variables {
            self.binding(1, key, value)?;
        }
        Ok(())
    }

    /// Phony aggregate target. An empty input list is legal and declares
    /// an always-clean target.
    pub fn phony(&mut self, name: &str, inputs: &[&str]) -> io::Result<()> {
        self.build(&[name], "phony", inputs, &[])
    }

    pub fn default(&mut self, target: &str) -> io::Result<()> {
        writeln!(self.out, "default {}", target)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn binding(&mut self, indent: usize, key: &str, value: &str) -> io::Result<()> {
        let pad = "  ".repeat(indent);
        if value.is_empty() {
            writeln!(self.out, "{}{} =", pad, key)
        } else {
            writeln!(self.out, "{}{} = {}", pad, key, value)
        }
    }
}
