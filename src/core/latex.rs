//! LaTeX to Unicode conversion for BibTeX field values.
//!
//! Handles accent commands, named symbols, text-formatting wrappers, TeX
//! ligature dashes and grouping braces. Math (`$...$`) is passed through.

/// Converts LaTeX markup to plain Unicode text and drops grouping braces.
pub fn latex_to_unicode(input: &str) -> String {
    if !input.contains(['\\', '{', '}', '-', '~', '`', '\'']) {
        return input.to_string();
    }
    let mut converter = Converter {
        chars: input.chars().collect(),
        pos: 0,
    };
    converter.run(false)
}

struct Converter {
    chars: Vec<char>,
    pos: usize,
}

impl Converter {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn run(&mut self, in_group: bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            match c {
                '\\' => self.command(&mut out),
                '{' => {
                    self.pos += 1;
                    let inner = self.run(true);
                    out.push_str(&inner);
                }
                '}' => {
                    self.pos += 1;
                    if in_group {
                        return out;
                    }
                }
                '-' => {
                    if self.peek_at(1) == Some('-') && self.peek_at(2) == Some('-') {
                        out.push('\u{2014}');
                        self.pos += 3;
                    } else if self.peek_at(1) == Some('-') {
                        out.push('\u{2013}');
                        self.pos += 2;
                    } else {
                        out.push('-');
                        self.pos += 1;
                    }
                }
                '~' => {
                    out.push('\u{a0}');
                    self.pos += 1;
                }
                '`' if self.peek_at(1) == Some('`') => {
                    out.push('\u{201c}');
                    self.pos += 2;
                }
                '\'' if self.peek_at(1) == Some('\'') => {
                    out.push('\u{201d}');
                    self.pos += 2;
                }
                _ => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
        out
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(c) if c == ' ' || c == '\t' || c == '\n') {
            self.pos += 1;
        }
    }

    fn command(&mut self, out: &mut String) {
        // at the backslash
        self.pos += 1;
        let Some(first) = self.peek() else {
            out.push('\\');
            return;
        };

        let name: String = if first.is_ascii_alphabetic() {
            let start = self.pos;
            while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
                self.pos += 1;
            }
            self.chars[start..self.pos].iter().collect()
        } else {
            self.pos += 1;
            first.to_string()
        };
        let is_word = first.is_ascii_alphabetic();

        if let Some(mark) = accent_mark(&name) {
            if is_word {
                self.skip_spaces();
            }
            let argument = self.argument();
            out.push_str(&apply_accent(&name, mark, &argument));
            return;
        }

        if is_formatting(&name) {
            self.skip_spaces();
            if self.peek() == Some('{') {
                self.pos += 1;
                let inner = self.run(true);
                out.push_str(&inner);
            }
            return;
        }

        if let Some(symbol) = symbol(&name) {
            out.push_str(symbol);
            if is_letter_symbol(&name) && self.peek() == Some(' ') {
                self.pos += 1;
            }
            return;
        }

        match name.as_str() {
            "&" | "%" | "$" | "#" | "_" | "{" | "}" => out.push_str(&name),
            " " | "\\" => out.push(' '),
            "-" => {} // discretionary hyphen
            _ => {
                out.push('\\');
                out.push_str(&name);
            }
        }
    }

    /// Reads the argument of an accent: a braced group, a nested command, or
    /// a single character.
    fn argument(&mut self) -> String {
        match self.peek() {
            Some('{') => {
                self.pos += 1;
                self.run(true)
            }
            Some('\\') => {
                let mut nested = String::new();
                self.command(&mut nested);
                nested
            }
            Some(c) => {
                self.pos += 1;
                c.to_string()
            }
            None => String::new(),
        }
    }
}

fn apply_accent(name: &str, mark: char, argument: &str) -> String {
    let mut chars = argument.chars();
    let Some(base) = chars.next() else {
        return match name {
            "~" | "^" | "`" | "'" => name.to_string(),
            _ => mark.to_string(),
        };
    };
    let rest: String = chars.collect();
    match compose(name, base) {
        Some(composed) => format!("{}{}", composed, rest),
        None => format!("{}{}{}", base, mark, rest),
    }
}

fn accent_mark(name: &str) -> Option<char> {
    let mark = match name {
        "'" => '\u{0301}',
        "`" => '\u{0300}',
        "^" => '\u{0302}',
        "\"" => '\u{0308}',
        "~" => '\u{0303}',
        "=" => '\u{0304}',
        "." => '\u{0307}',
        "c" => '\u{0327}',
        "v" => '\u{030c}',
        "u" => '\u{0306}',
        "H" => '\u{030b}',
        "r" => '\u{030a}',
        "k" => '\u{0328}',
        "d" => '\u{0323}',
        "b" => '\u{0331}',
        _ => return None,
    };
    Some(mark)
}

/// Base/composed pairs per accent, written as alternating characters.
fn composition_pairs(name: &str) -> &'static str {
    match name {
        "'" => "aáeéiíoóuúyýAÁEÉIÍOÓUÚYÝcćCĆnńNŃsśSŚzźZŹlĺLĹrŕRŔgǵGǴwẃWẂıí",
        "`" => "aàeèiìoòuùAÀEÈIÌOÒUÙıìnǹNǸwẁWẀyỳYỲ",
        "^" => "aâeêiîoôuûAÂEÊIÎOÔUÛıîcĉCĈgĝGĜhĥHĤjĵJĴsŝSŜwŵWŴyŷYŶ",
        "\"" => "aäeëiïoöuüyÿAÄEËIÏOÖUÜYŸıï",
        "~" => "aãoõnñAÃOÕNÑiĩIĨuũUŨıĩ",
        "=" => "aāeēiīoōuūAĀEĒIĪOŌUŪıī",
        "." => "cċCĊeėEĖgġGĠIİzżZŻ",
        "c" => "cçCÇsşSŞtţTŢgģGĢkķKĶlļLĻnņNŅrŗRŖ",
        "v" => "cčCČsšSŠzžZŽeěEĚrřRŘnňNŇdďDĎtťTŤ",
        "u" => "aăAĂgğGĞuŭUŬ",
        "H" => "oőOŐuűUŰ",
        "r" => "aåAÅuůUŮ",
        "k" => "aąAĄeęEĘiįIĮuųUŲ",
        _ => "",
    }
}

fn compose(name: &str, base: char) -> Option<char> {
    let pairs: Vec<char> = composition_pairs(name).chars().collect();
    pairs
        .chunks_exact(2)
        .find(|pair| pair[0] == base)
        .map(|pair| pair[1])
}

fn is_formatting(name: &str) -> bool {
    matches!(
        name,
        "emph"
            | "textit"
            | "textbf"
            | "textsc"
            | "texttt"
            | "textrm"
            | "textsf"
            | "textup"
            | "textsl"
            | "textnormal"
            | "text"
            | "mathrm"
            | "mathit"
            | "mathbf"
            | "url"
            | "mbox"
            | "hbox"
    )
}

fn is_letter_symbol(name: &str) -> bool {
    matches!(
        name,
        "ss" | "SS"
            | "o"
            | "O"
            | "ae"
            | "AE"
            | "oe"
            | "OE"
            | "aa"
            | "AA"
            | "l"
            | "L"
            | "i"
            | "j"
            | "dh"
            | "DH"
            | "th"
            | "TH"
            | "ng"
            | "NG"
    )
}

fn symbol(name: &str) -> Option<&'static str> {
    let s = match name {
        "ss" => "ß",
        "SS" => "ẞ",
        "o" => "ø",
        "O" => "Ø",
        "ae" => "æ",
        "AE" => "Æ",
        "oe" => "œ",
        "OE" => "Œ",
        "aa" => "å",
        "AA" => "Å",
        "l" => "ł",
        "L" => "Ł",
        "i" => "ı",
        "j" => "ȷ",
        "dh" => "ð",
        "DH" => "Ð",
        "th" => "þ",
        "TH" => "Þ",
        "ng" => "ŋ",
        "NG" => "Ŋ",
        "textendash" => "\u{2013}",
        "textemdash" => "\u{2014}",
        "ldots" | "dots" | "textellipsis" => "\u{2026}",
        "S" => "§",
        "P" => "¶",
        "copyright" | "textcopyright" => "©",
        "textregistered" => "®",
        "texttrademark" => "™",
        "pounds" => "£",
        "euro" => "€",
        "textquoteleft" => "\u{2018}",
        "textquoteright" => "\u{2019}",
        "textquotedblleft" => "\u{201c}",
        "textquotedblright" => "\u{201d}",
        "guillemotleft" => "«",
        "guillemotright" => "»",
        "textdegree" => "°",
        "textasciitilde" => "~",
        "textbackslash" => "\\",
        "textunderscore" => "_",
        "textbar" => "|",
        "textless" => "<",
        "textgreater" => ">",
        "LaTeX" => "LaTeX",
        "TeX" => "TeX",
        _ => return None,
    };
    Some(s)
}
