use clap::ValueEnum;

/// Language the synthesized plan is written in.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lang {
    #[default]
    En,
    Es,
}

impl Lang {
    pub fn apply_to_prompt(self, prompt: &str) -> String {
        match self {
            Lang::En => format!("{prompt}\nWrite the entire plan in English."),
            Lang::Es => format!("{prompt}\nWrite the entire plan in Spanish (español)."),
        }
    }
}
