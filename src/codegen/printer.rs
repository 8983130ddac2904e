/// Line-oriented output buffer for generated C++.
/// One indent level is four spaces.
pub struct Printer {
    output: String,
    indent: usize,
}

impl Printer {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    pub fn with_indent(indent: usize) -> Self {
        Self {
            output: String::new(),
            indent,
        }
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    pub fn writeln(&mut self, s: &str) {
        self.output.push_str(s);
        self.output.push('\n');
    }

    /// Indented line.
    pub fn line(&mut self, s: &str) {
        self.print_indent();
        self.writeln(s);
    }

    pub fn newline(&mut self) {
        self.output.push('\n');
    }

    pub fn print_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
    }

    /// Indented chain `head` then `.member` lines one level deeper, closed with `;`.
    pub fn chain(&mut self, head: &str, members: &[String]) {
        self.print_indent();
        self.write(head);
        if members.is_empty() {
            self.writeln(";");
            return;
        }
        self.newline();
        self.indent();
        for (i, member) in members.iter().enumerate() {
            self.print_indent();
            self.write(member);
            if i + 1 == members.len() {
                self.write(";");
            }
            self.newline();
        }
        self.dedent();
    }

    pub fn finish(self) -> String {
        self.output
    }
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_terminates_last_member() {
        let mut p = Printer::with_indent(1);
        p.chain("py::class_<A>(m_, \"A\")", &[".def(py::init<>())".into(), ".def_readwrite(\"x\", &A::x)".into()]);
        assert_eq!(
            p.finish(),
            "    py::class_<A>(m_, \"A\")\n        .def(py::init<>())\n        .def_readwrite(\"x\", &A::x);\n"
        );
    }

    #[test]
    fn test_empty_chain() {
        let mut p = Printer::with_indent(1);
        p.chain("py::class_<A>(m_, \"A\")", &[]);
        assert_eq!(p.finish(), "    py::class_<A>(m_, \"A\");\n");
    }
}
