pub mod filename;

pub use filename::{
    LocalFileMatch, ShowFilePattern, TitleRule, parse_season_folder, parse_title,
    parse_title_with_rule,
};
