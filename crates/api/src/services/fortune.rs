//! Fortune generation pipeline.
//!
//! One fortune per attendee per event day: find today's recommendation,
//! record the pairing in the background, ask the backend for the message,
//! and fall back to a locally synthesized introduction when the backend
//! times out or misbehaves. The caller always gets a message.

use std::sync::Arc;

use chrono::Utc;
use domain::models::{cooldown_start, MatchCandidate};
use domain::services::fortune_schedule;
use persistence::entities::UserEntity;
use persistence::repositories::{MatchRepository, UserRepository};
use persistence::StoreError;
use serde_json::json;
use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::services::llm::LlmClient;

/// Served when no eligible counterpart exists today.
const SOLO_MESSAGE_PREFIX: &str = "你好，";
const SOLO_MESSAGE_SUFFIX: &str = "。今日的世界静悄悄，适合与自己对话，期待明日的缘分吧。";

/// Fixed tone and format instructions sent with every generation request.
/// Profile data is prepended as sanitized JSON; see [`build_prompt`].
const PROMPT_INSTRUCTIONS: &str = r#"你是一个名为"Autopia"的【天天爱 白日梦限定演出】音乐节社交助手。你的角色定位是一个「音乐现场的故事发现者」与「有趣灵魂的连接者」，像一个敏锐的音乐节向导。

你的核心目标不是"配对"，而是通过"Autopia 时刻观察"和"人物故事"的结合，为主用户（User 1）打开一扇窗，让他们发现身边另一个有趣的音乐灵魂（User 2）。

【关于 Autopia 时刻】：Autopia = A Utopia（一个乌托邦）。"Autopia 时刻"指现场那些让人感受到理想世界美好的瞬间——音乐与心灵的共鸣、陌生人之间的温暖连接、音乐中的纯真与自由。

【MBTI 融合】：若用户信息包含 MBTI 类型，请将其特质与音乐节体验自然结合（内向型享受深度聆听、外向型热衷现场互动等），但不要直接提及 MBTI 术语。

创作要求：
1. 以一段充满现场感和梦幻色彩的"Autopia 时刻观察"开场，再自然过渡到介绍 User 2。此部分严禁引用或分析 User 1 的 bio。
2. 把 User 2 当作一个故事主角来介绍，描绘其 bio 中体现的美好追求与生活态度。若包含最喜欢的歌曲，只轻松一带而过，严禁深度解读歌词或由歌曲推断性格。
3. 自然地暗示这位有趣的人此刻也同在现场。
4. 结尾用一句带有现场感的话过渡到联系方式。

输出格式（必须严格遵守）：
总字数在350个汉字以内。两段式结构，由一个恰好3个短横线的分隔符（---）隔开，分隔符前后各有一个空行。
第一部分：完整的、口语化的私信内容，可适度使用 emoji。
第二部分：联系人名片，格式为：

---

👉 **去发现这个有趣人类**

- **姓名：** <User 2 的姓名>

- **微信号：** <User 2 的微信号>

输出一个完整的、无须修改的最终成品，不要包含任何元注释或解释。"#;

/// Generates, persists, and returns daily fortune messages.
pub struct FortuneService {
    users: UserRepository,
    matches: MatchRepository,
    llm: Arc<dyn LlmClient>,
}

impl FortuneService {
    pub fn new(pool: PgPool, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            matches: MatchRepository::new(pool),
            llm,
        }
    }

    /// Whether `user` is due for a fresh fortune right now.
    pub fn needs_refresh(user: &UserEntity) -> bool {
        fortune_schedule::needs_refresh(Utc::now(), user.last_fortune_at)
    }

    /// Generates a new fortune for `user`, persists it, and returns the text.
    ///
    /// Never fails on backend trouble: timeouts, bad statuses, and malformed
    /// bodies all route to the local fallback. Only datastore failures
    /// propagate.
    pub async fn generate(&self, user: &UserEntity) -> Result<String, StoreError> {
        let now = Utc::now();

        let candidate = self
            .matches
            .find_candidate(
                user.id,
                user.gender.as_deref(),
                cooldown_start(now),
                fortune_schedule::day_start(now),
            )
            .await?;

        let Some(candidate) = candidate else {
            info!(user_id = user.id, "no eligible match today, serving solo message");
            let message = solo_message(&user.name);
            self.users.persist_fortune(user.id, &message, now).await?;
            return Ok(message);
        };

        let candidate: MatchCandidate = candidate.into();
        info!(
            user_id = user.id,
            candidate_id = candidate.id,
            "match found, generating fortune"
        );

        // Best-effort: the pairing record must never block the response.
        {
            let matches = self.matches.clone();
            let (seeker_id, target_id) = (user.id, candidate.id);
            tokio::spawn(async move {
                if let Err(e) = matches.record(seeker_id, target_id, now).await {
                    error!(
                        seeker_id,
                        target_id,
                        error = %e,
                        "failed to record match"
                    );
                }
            });
        }

        let prompt = build_prompt(user, &candidate);
        let message = match self.llm.chat(&prompt).await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => {
                warn!(user_id = user.id, "backend returned empty fortune, using fallback");
                fallback_message(user, &candidate)
            }
            Err(e) => {
                warn!(user_id = user.id, error = %e, "fortune backend failed, using fallback");
                fallback_message(user, &candidate)
            }
        };

        self.users.persist_fortune(user.id, &message, now).await?;
        Ok(message)
    }
}

fn solo_message(name: &str) -> String {
    format!("{SOLO_MESSAGE_PREFIX}{name}{SOLO_MESSAGE_SUFFIX}")
}

/// Prompt = sanitized profile JSON + fixed instructions.
///
/// The requester's wechat id is deliberately absent: only the candidate's
/// contact belongs in the generated card.
fn build_prompt(user: &UserEntity, candidate: &MatchCandidate) -> String {
    let requester = json!({
        "name": user.name,
        "gender": user.gender,
        "bio": user.bio,
        "birthdate": user.birthdate,
        "mbti": user.mbti,
        "favorite_song": user.favorite_song,
    });
    let target = json!({
        "name": candidate.name,
        "gender": candidate.gender,
        "bio": candidate.bio,
        "birthdate": candidate.birthdate,
        "mbti": candidate.mbti,
        "favorite_song": candidate.favorite_song,
        "wechat_id": candidate.wechat_id,
    });

    format!(
        "【用户信息】\n主用户 (User 1): {requester}\n被推荐用户 (User 2): {target}\n\n{PROMPT_INSTRUCTIONS}"
    )
}

/// Contact card appended to every two-part message.
fn contact_card(candidate: &MatchCandidate) -> String {
    format!(
        "---\n\n👉 **去发现这个有趣人类**\n\n- **姓名：** {}\n\n- **微信号：** {}",
        candidate.name, candidate.wechat_id
    )
}

/// Locally synthesized introduction used when the backend fails.
///
/// Still delivers the user-facing value: who the match is, what they are
/// about, and how to reach them.
fn fallback_message(user: &UserEntity, candidate: &MatchCandidate) -> String {
    let candidate_bio = candidate.bio.as_deref().unwrap_or("一个有趣的灵魂");
    format!(
        "你好，{}！现场太嗨了，系统有点跟不上节拍，让我直接为你介绍一位有趣的朋友吧～\n\n{} 此刻也同在音乐节现场，\"{}\"\n\n{}",
        user.name,
        candidate.name,
        candidate_bio,
        contact_card(candidate)
    )
}
