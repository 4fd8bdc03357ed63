//! User-facing reply texts.

use rqbot_backend::{Candidate, QueueEntry};

/// Command summary sent for `ajuda` and for unrecognised text in groups.
pub const HELP_TEXT: &str = "🎵 *RQ Assistente*: comandos\n\
• tocar <link | ID | busca>: toca um link, um áudio importado ou busca no YouTube\n\
• pausar: pausa ou retoma\n\
• pular: próxima faixa\n\
• volume <0-100>: ajusta o volume\n\
• fila: mostra a fila\n\
• limpar: limpa a fila\n\
• rotulo <ID> <texto>: dá um nome a um áudio importado\n\
• ajuda: mostra esta mensagem\n\
Envie um áudio para importá-lo. Em grupos, me mencione antes do comando.";

pub const ONBOARDING_GREETING: &str = "👋 Olá! Eu sou o RQ Assistente e controlo a música daqui.";

pub const GENERIC_ERROR: &str = "⚠️ Erro ao processar comando.";
pub const BACKEND_FAILURE: &str = "⚠️ Falha ao falar com o servidor de mídia. Tente novamente.";

pub const PLAY_USAGE: &str = "⚠️ Use: tocar <link | ID | busca>";
pub const VOLUME_USAGE: &str = "⚠️ Use: volume <0-100>";
pub const LABEL_USAGE: &str = "⚠️ Use: rotulo <ID> <texto>";

pub const CONFIRMATION_REQUIRED: &str =
    "⚠️ O servidor pediu confirmação para esse link. Tente outro link ou use a busca.";
pub const TOGGLED: &str = "⏯️ Play/pause alternado.";
pub const SKIPPED: &str = "⏭️ Pulando para a próxima.";
pub const QUEUE_EMPTY: &str = "📭 A fila está vazia.";
pub const QUEUE_CLEARED: &str = "🧹 Fila limpa.";
pub const SELECTION_CANCELLED: &str = "❌ Seleção cancelada.";

pub const UNSUPPORTED_MEDIA: &str =
    "❌ Só aceito arquivos de áudio (mp3, wav, flac, aac, ogg, m4a, opus).";
pub const MEDIA_FAILURE: &str = "⚠️ Falha ao processar o áudio.";

pub fn onboarding() -> String {
    format!("{ONBOARDING_GREETING}\n\n{HELP_TEXT}")
}

pub fn streaming(what: &str) -> String {
    format!("▶️ Transmitindo: {what}")
}

pub fn enqueued(title: &str) -> String {
    format!("▶️ Adicionado à fila: {title}")
}

pub fn local_not_found(code: &str) -> String {
    format!("❌ ID {code} não encontrado na biblioteca.")
}

pub fn nothing_found(query: &str) -> String {
    format!("🔎 Nada encontrado para \"{query}\".")
}

pub fn volume_set(value: u8) -> String {
    format!("🔊 Volume ajustado para {value}%.")
}

pub fn label_set(code: &str, label: &str) -> String {
    format!("🏷️ Rótulo de {code} definido: {label}")
}

pub fn invalid_index(max: usize) -> String {
    format!("⚠️ Opção inválida. Escolha um número de 1 a {max} ou \"cancelar\".")
}

pub fn media_imported(id: &str, ext: &str) -> String {
    format!("📥 Áudio recebido ({ext}). ID: {id}\nDefina rótulo: rotulo {id} <texto>\nTocar: tocar {id}")
}

/// Numbered listing of search results.
pub fn search_listing(query: &str, candidates: &[Candidate]) -> String {
    let mut out = format!("🔎 Resultados para \"{query}\":\n");
    for (i, c) in candidates.iter().enumerate() {
        out.push_str(&format!("{}. {}", i + 1, c.title));
        if !c.subtitle.is_empty() {
            out.push_str(&format!(" ({})", c.subtitle));
        }
        if !c.duration.is_empty() {
            out.push_str(&format!(" [{}]", c.duration));
        }
        out.push('\n');
    }
    out.push_str(&format!(
        "Responda com o número (1-{}) ou \"cancelar\".",
        candidates.len()
    ));
    out
}

/// Playlist rendering, at most `limit` entries, the current one marked.
pub fn queue_listing(entries: &[QueueEntry], limit: usize) -> String {
    if entries.is_empty() {
        return QUEUE_EMPTY.to_string();
    }

    let mut out = String::from("📃 Fila:");
    for (i, e) in entries.iter().take(limit).enumerate() {
        let marker = if e.current { "▶️" } else { "▫️" };
        out.push_str(&format!("\n{marker} {}. {}", i + 1, e.filename));
    }
    if entries.len() > limit {
        out.push_str(&format!("\n... e mais {}", entries.len() - limit));
    }
    out
}
