//! User-facing messages for the auth flow.
//!
//! The job board serves six languages; the flow picks one from the request's
//! `Accept-Language` header and falls back to English. Only the messages the
//! flow surfaces live here; page copy belongs to the frontend.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lang {
    #[default]
    En,
    Zh,
    Hi,
    Km,
    Ar,
    Ja,
}

impl Lang {
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split(['-', ';']).next().unwrap_or_default().trim();
        match primary.to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "zh" => Some(Self::Zh),
            "hi" => Some(Self::Hi),
            "km" => Some(Self::Km),
            "ar" => Some(Self::Ar),
            "ja" => Some(Self::Ja),
            _ => None,
        }
    }

    /// First supported language in an `Accept-Language` header, else English.
    #[must_use]
    pub fn from_accept_language(header: &str) -> Self {
        header
            .split(',')
            .find_map(|tag| Self::from_tag(tag.trim()))
            .unwrap_or_default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Text {
    GenericError,
    EmailNotConfirmed,
    ConfirmationSent,
    CodeSent,
    CodeIncomplete,
    VerificationFailed,
    VerificationSuccess,
    ResendFailed,
    EmailSendFailed,
    EmailServiceUnavailable,
    NoPendingVerification,
    RequiredField,
    Processing,
}

/// Look up a message. Languages without a translation for a given key fall
/// back to English rather than showing a raw key.
#[must_use]
pub fn text(lang: Lang, key: Text) -> &'static str {
    match lang {
        Lang::En => en(key),
        Lang::Zh => zh(key),
        Lang::Hi => hi(key).unwrap_or_else(|| en(key)),
        Lang::Km => km(key).unwrap_or_else(|| en(key)),
        Lang::Ar => ar(key).unwrap_or_else(|| en(key)),
        Lang::Ja => ja(key).unwrap_or_else(|| en(key)),
    }
}

const fn en(key: Text) -> &'static str {
    match key {
        Text::GenericError => "Something went wrong. Please try again later.",
        Text::EmailNotConfirmed => {
            "Your email is not confirmed. Please check your inbox and confirm your email."
        }
        Text::ConfirmationSent => "Confirmation email has been sent. Please check your inbox.",
        Text::CodeSent => "Verification code sent. Please check your inbox.",
        Text::CodeIncomplete => "Please enter the 6-digit verification code.",
        Text::VerificationFailed => "Verification failed. Please try again.",
        Text::VerificationSuccess => "Email verified. Signing you in...",
        Text::ResendFailed => "Could not resend the code. Please try again later.",
        Text::EmailSendFailed => "Failed to send email. Please try again later.",
        Text::EmailServiceUnavailable => "Email service is temporarily unavailable.",
        Text::NoPendingVerification => "No pending verification for this email.",
        Text::RequiredField => "This field is required",
        Text::Processing => "Processing...",
    }
}

const fn zh(key: Text) -> &'static str {
    match key {
        Text::GenericError => "发生错误，请稍后重试。",
        Text::EmailNotConfirmed => "邮箱未确认，请前往邮箱查收确认邮件后再尝试登录。",
        Text::ConfirmationSent => "确认邮件已发送，请查收。",
        Text::CodeSent => "验证码已发送，请注意查收。",
        Text::CodeIncomplete => "请输入6位验证码。",
        Text::VerificationFailed => "验证失败，请重试。",
        Text::VerificationSuccess => "验证成功，正在为您登录...",
        Text::ResendFailed => "重发验证码失败，请稍后重试。",
        Text::EmailSendFailed => "邮件发送失败，请稍后重试。",
        Text::EmailServiceUnavailable => "邮件服务暂时不可用。",
        Text::NoPendingVerification => "该邮箱没有待验证的注册。",
        Text::RequiredField => "此字段为必填项",
        Text::Processing => "处理中...",
    }
}

const fn hi(key: Text) -> Option<&'static str> {
    match key {
        Text::GenericError => Some("कुछ गलत हो गया। कृपया बाद में पुनः प्रयास करें।"),
        Text::EmailNotConfirmed => {
            Some("आपका ईमेल सत्यापित नहीं है। कृपया इनबॉक्स में पुष्टि ईमेल देखें।")
        }
        Text::ConfirmationSent => Some("पुष्टिकरण ईमेल भेज दिया गया है।"),
        Text::RequiredField => Some("यह फ़ील्ड आवश्यक है"),
        Text::Processing => Some("प्रोसेसिंग..."),
        _ => None,
    }
}

const fn km(key: Text) -> Option<&'static str> {
    match key {
        Text::GenericError => Some("មានបញ្ហាអ្វីមួយ។ សូមព្យាយាមម្ដងទៀត។"),
        Text::EmailNotConfirmed => {
            Some("អ៊ីមែលរបស់អ្នកមិនទាន់បានបញ្ជាក់ទេ។ សូមពិនិត្យប្រអប់សារអ៊ីមែលរបស់អ្នក។")
        }
        Text::ConfirmationSent => Some("បានផ្ញើអ៊ីមែលអះអាងរួចរាល់។"),
        Text::RequiredField => Some("ត្រូវការបំពេញផ្នែកនេះ"),
        Text::Processing => Some("កំពុងដំណើរការ..."),
        _ => None,
    }
}

const fn ar(key: Text) -> Option<&'static str> {
    match key {
        Text::GenericError => Some("حدث خطأ ما. يرجى المحاولة لاحقًا."),
        Text::EmailNotConfirmed => {
            Some("لم يتم تأكيد بريدك الإلكتروني. يرجى التحقق من بريدك لتأكيده.")
        }
        Text::ConfirmationSent => Some("تم إرسال بريد التأكيد، يرجى التحقق من بريدك."),
        Text::RequiredField => Some("هذا الحقل مطلوب"),
        Text::Processing => Some("جاري المعالجة..."),
        _ => None,
    }
}

const fn ja(key: Text) -> Option<&'static str> {
    match key {
        Text::GenericError => Some("問題が発生しました。しばらくしてからもう一度お試しください。"),
        Text::EmailNotConfirmed => {
            Some("メールが確認されていません。メールボックスをご確認ください。")
        }
        Text::ConfirmationSent => Some("確認メールを送信しました。"),
        Text::RequiredField => Some("この項目は必須です"),
        Text::Processing => Some("処理中..."),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_language_picks_first_supported() {
        assert_eq!(Lang::from_accept_language("zh-CN,zh;q=0.9,en;q=0.8"), Lang::Zh);
        assert_eq!(Lang::from_accept_language("fr-FR,km;q=0.8"), Lang::Km);
        assert_eq!(Lang::from_accept_language("ja"), Lang::Ja);
    }

    #[test]
    fn unknown_languages_fall_back_to_english() {
        assert_eq!(Lang::from_accept_language("fr-FR,de;q=0.9"), Lang::En);
        assert_eq!(Lang::from_accept_language(""), Lang::En);
    }

    #[test]
    fn untranslated_keys_fall_back_to_english() {
        assert_eq!(
            text(Lang::Hi, Text::VerificationFailed),
            text(Lang::En, Text::VerificationFailed)
        );
        assert_ne!(text(Lang::Zh, Text::VerificationFailed), "");
    }

    #[test]
    fn translated_keys_differ_from_english() {
        assert_ne!(
            text(Lang::Zh, Text::GenericError),
            text(Lang::En, Text::GenericError)
        );
        assert_ne!(
            text(Lang::Ar, Text::RequiredField),
            text(Lang::En, Text::RequiredField)
        );
    }
}
