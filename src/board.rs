/// The lottery boards ("bancas") the bot can analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, poise::ChoiceParameter)]
pub enum Board {
    #[name = "Rio de Janeiro"]
    RioDeJaneiro,
    #[name = "Look de Goiás"]
    LookDeGoias,
    #[name = "Nacional"]
    Nacional,
    #[name = "Bahia"]
    Bahia,
    #[name = "São Paulo"]
    SaoPaulo,
    #[name = "Lotep"]
    Lotep,
    #[name = "Popular"]
    Popular,
}

impl Board {
    #[cfg(test)]
    pub const ALL: [Board; 7] = [
        Board::RioDeJaneiro,
        Board::LookDeGoias,
        Board::Nacional,
        Board::Bahia,
        Board::SaoPaulo,
        Board::Lotep,
        Board::Popular,
    ];

    /// Name as published by the result sites; this is what goes into the prompt.
    pub fn label(self) -> &'static str {
        match self {
            Board::RioDeJaneiro => "Rio de Janeiro",
            Board::LookDeGoias => "Look de Goiás",
            Board::Nacional => "Nacional",
            Board::Bahia => "Bahia",
            Board::SaoPaulo => "São Paulo",
            Board::Lotep => "Lotep",
            Board::Popular => "Popular",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Board::RioDeJaneiro => "🏟️",
            Board::LookDeGoias => "🌵",
            Board::Nacional => "🇧🇷",
            Board::Bahia => "🏖️",
            Board::SaoPaulo => "🏙️",
            Board::Lotep => "💰",
            Board::Popular => "⭐️",
        }
    }
}
