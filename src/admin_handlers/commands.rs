use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "snake_case", description = "Moderation admin commands:")]
pub enum AdminCommand {
    #[command(description = "show this help.")]
    Help,
    #[command(description = "add a forbidden word.")]
    AddWord { word: String },
    #[command(description = "remove a forbidden word.")]
    DelWord { word: String },
    #[command(description = "list forbidden words.")]
    Words,
    #[command(description = "allow-list a link.")]
    AddLink { link: String },
    #[command(description = "remove an allow-listed link.")]
    DelLink { link: String },
    #[command(description = "list allow-listed links.")]
    Links,
    #[command(description = "set the mute duration in minutes.")]
    SetMute { minutes: u64 },
    #[command(description = "punish link violations with 'mute' or 'ban'.")]
    LinkPunish { mode: String },
    #[command(description = "turn anti-link filtering 'on' or 'off'.")]
    AntiLinks { state: String },
    #[command(description = "enforce inside 'topics' only or the whole 'chat'.")]
    Scope { scope: String },
    #[command(description = "allow-list matching: 'exact' or 'substring'.")]
    LinkMatch { policy: String },
    #[command(description = "download the violation log.")]
    GetLog,
    #[command(description = "clear the violation log.")]
    ClearLog,
    #[command(description = "grant admin rights to a user id.")]
    AddAdmin { user_id: u64 },
    #[command(description = "revoke admin rights from a user id.")]
    DelAdmin { user_id: u64 },
    #[command(description = "list admins.")]
    Admins,
}
