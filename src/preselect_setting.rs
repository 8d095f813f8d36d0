use clap::ValueEnum;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
#[clap(rename_all = "kebab_case")]
pub enum PreselectSetting {
    All,
    None,
    /// Keep whatever the page rendered as checked.
    Page,
}

impl PreselectSetting {
    pub fn preselected(&self, checked_on_page: bool) -> bool {
        match self {
            PreselectSetting::All => true,
            PreselectSetting::None => false,
            PreselectSetting::Page => checked_on_page,
        }
    }
}
