//! Text markup compiler.
//!
//! Markup: `^x` superscript and `_x` subscript, `\i x` italic and `\b x`
//! bold, where `x` is a single character, an escape or a `{…}` group.
//! `\\` is a literal backslash and `\name` inserts the symbol of a LaTeX
//! name (`\alpha`, `\infty`, …). Any other escaped character is literal.

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Script {
    #[default]
    Normal,
    Super,
    Sub,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct Style {
    pub script: Script,
    pub italic: bool,
    pub bold: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct StyledChar {
    pub ch: char,
    pub style: Style,
}

const ESCAPES: &[(&str, char)] = &[
    ("AA", 'Å'),
    ("Delta", 'Δ'),
    ("Gamma", 'Γ'),
    ("Lambda", 'Λ'),
    ("Omega", 'Ω'),
    ("Phi", 'Φ'),
    ("Pi", 'Π'),
    ("Psi", 'Ψ'),
    ("Sigma", 'Σ'),
    ("Theta", 'Θ'),
    ("Upsilon", 'Υ'),
    ("Xi", 'Ξ'),
    ("alpha", 'α'),
    ("approx", '≈'),
    ("beta", 'β'),
    ("bullet", '•'),
    ("cdot", '·'),
    ("chi", 'χ'),
    ("circ", '∘'),
    ("deg", '°'),
    ("delta", 'δ'),
    ("div", '÷'),
    ("downarrow", '↓'),
    ("epsilon", 'ε'),
    ("equiv", '≡'),
    ("eta", 'η'),
    ("exists", '∃'),
    ("forall", '∀'),
    ("gamma", 'γ'),
    ("geq", '≥'),
    ("in", '∈'),
    ("infty", '∞'),
    ("int", '∫'),
    ("iota", 'ι'),
    ("kappa", 'κ'),
    ("lambda", 'λ'),
    ("leftarrow", '←'),
    ("leq", '≤'),
    ("mu", 'μ'),
    ("nabla", '∇'),
    ("neq", '≠'),
    ("nu", 'ν'),
    ("omega", 'ω'),
    ("partial", '∂'),
    ("phi", 'φ'),
    ("pi", 'π'),
    ("pm", '±'),
    ("prime", '′'),
    ("prod", '∏'),
    ("psi", 'ψ'),
    ("rho", 'ρ'),
    ("rightarrow", '→'),
    ("sigma", 'σ'),
    ("sqrt", '√'),
    ("sum", '∑'),
    ("tau", 'τ'),
    ("theta", 'θ'),
    ("times", '×'),
    ("uparrow", '↑'),
    ("upsilon", 'υ'),
    ("xi", 'ξ'),
    ("zeta", 'ζ'),
];

/// Symbol for a LaTeX-style name.
pub fn escape(name: &str) -> Option<char> {
    ESCAPES.binary_search_by(|(n, _)| n.cmp(&name)).ok().map(|i| ESCAPES[i].1)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    out: Vec<StyledChar>,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Parses until end of input, or the closing brace of a group.
    fn sequence(&mut self, style: Style, in_group: bool) {
        while let Some(c) = self.peek() {
            if c == '}' && in_group {
                self.pos += 1;
                return;
            }
            self.item(style);
        }
    }

    /// One character, escape or group, with `^`/`_`/`\i`/`\b` applied to
    /// the item that follows them.
    fn item(&mut self, style: Style) {
        let Some(c) = self.peek() else { return };
        self.pos += 1;
        match c {
            '{' => self.sequence(style, true),
            '^' => self.item(Style { script: Script::Super, ..style }),
            '_' => self.item(Style { script: Script::Sub, ..style }),
            '\\' => self.escaped(style),
            ch => self.out.push(StyledChar { ch, style }),
        }
    }

    fn escaped(&mut self, style: Style) {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        if name.is_empty() {
            // `\\`, `\^`, `\{` ...
            if let Some(ch) = self.peek() {
                self.pos += 1;
                self.out.push(StyledChar { ch, style });
            }
            return;
        }
        if let Some(ch) = escape(&name) {
            self.out.push(StyledChar { ch, style });
            return;
        }
        // Style switches bind to what follows the letter.
        match name.as_bytes()[0] {
            b'i' => {
                self.pos = start + 1;
                self.skip_space();
                self.item(Style { italic: true, ..style });
            }
            b'b' => {
                self.pos = start + 1;
                self.skip_space();
                self.item(Style { bold: true, ..style });
            }
            _ => {
                self.out.push(StyledChar { ch: '\\', style });
                self.out.extend(name.chars().map(|ch| StyledChar { ch, style }));
            }
        }
    }

    fn skip_space(&mut self) {
        if self.peek() == Some(' ') {
            self.pos += 1;
        }
    }
}

/// Compiles markup into styled characters.
pub fn compile(text: &str) -> Vec<StyledChar> {
    let mut p = Parser { chars: text.chars().collect(), pos: 0, out: Vec::new() };
    p.sequence(Style::default(), false);
    p.out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str) -> String {
        compile(text).iter().map(|c| c.ch).collect()
    }

    #[test]
    fn escape_table_is_sorted() {
        assert!(ESCAPES.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(escape("infty"), Some('∞'));
        assert_eq!(escape("nope"), None);
    }

    #[test]
    fn scripts_apply_to_one_item() {
        let c = compile("x^2y");
        assert_eq!(c[1].style.script, Script::Super);
        assert_eq!(c[2].style.script, Script::Normal);
    }

    #[test]
    fn groups_extend_styles() {
        let c = compile("e_{ij}k");
        assert_eq!(plain("e_{ij}k"), "eijk");
        assert_eq!(c[1].style.script, Script::Sub);
        assert_eq!(c[2].style.script, Script::Sub);
        assert_eq!(c[3].style.script, Script::Normal);
    }

    #[test]
    fn latex_names_become_symbols() {
        assert_eq!(plain(r"\alpha + \beta = 90\deg"), "α + β = 90°");
        assert_eq!(plain(r"\unknown"), r"\unknown");
    }

    #[test]
    fn italic_and_bold_switches() {
        let c = compile(r"\ix \b{ab}c");
        assert!(c[0].style.italic && c[0].ch == 'x');
        assert!(c[2].style.bold && c[3].style.bold);
        assert!(!c[4].style.bold);
    }

    #[test]
    fn backslash_escapes_are_literal() {
        assert_eq!(plain(r"a\\b\^c\{"), r"a\b^c{");
    }

    #[test]
    fn unbalanced_brace_runs_to_end() {
        assert_eq!(plain("{abc"), "abc");
        assert_eq!(plain("a}b"), "a}b");
    }
}
