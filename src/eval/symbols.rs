// Separators
pub const WHITESPACE: char = ' ';
pub const NEWLINE: char = '\n';

// Control tokens
pub const PIPE: &str = "|";
pub const AMPERSAND: &str = "&";
pub const DOLLAR: char = '$';

// Parameters
pub const SHELL_NAME_PARAMETER: &str = "$0";

// Redirection operators
pub const LESS: &str = "<";
pub const GREAT: &str = ">";
pub const DGREAT: &str = ">>";
