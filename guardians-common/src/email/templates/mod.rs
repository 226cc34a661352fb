use url::form_urlencoded;

pub struct RecoverySecretMessage {}

impl RecoverySecretMessage {
    pub fn generate(recovery_secret: &str, recovery_address: &str, recovery_url: &str) -> String {
        let encoded_address: String =
            form_urlencoded::byte_serialize(recovery_address.as_bytes()).collect();
        let link = format!("{}?RecoveryAddress={}", recovery_url, encoded_address);

        format!(
            "<html>
               <head>
                 <style>
                   body {{
                     font-family: Arial, sans-serif;
                     text-align: center;
                   }}
                 </style>
               </head>
             <body>
               <h1>Guardians Account Recovery</h1>
               <p>You are a guardian of the Stellar account <b>{}</b> and its owner has started \
               a recovery.</p>
               <p>Your recovery secret is:</p>
               <h2 style=\"font-family: 'Courier New', monospace; user-select: all; \
               -webkit-user-select: all;\"><b>{}</b></h2>
               <p><a href=\"{}\" rel=\"nofollow\">Click here to help with the recovery</a></p>
               <br />
               <p><i>We will never ask you for this secret over the phone or email. Do not \
               share it with anyone.</i></p>
             </body>
             </html>",
            html_escape(recovery_address),
            html_escape(recovery_secret),
            html_escape(&link),
        )
    }
}

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovery_message_contains_secret_and_link() {
        let message = RecoverySecretMessage::generate(
            "5f1c0ffee",
            "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H",
            "https://guardians.example/recover",
        );

        assert!(message.contains("<b>5f1c0ffee</b>"));
        assert!(message.contains(
            "href=\"https://guardians.example/recover?RecoveryAddress=\
             GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H\""
        ));
    }

    #[test]
    fn markup_in_recovery_address_is_escaped() {
        let recovery_address = "G\"><a href=\"https://evil.test\">x</a>\
                                <script>alert(1)</script>&RecoveryAddress=GOTHER";
        let message = RecoverySecretMessage::generate(
            "<i>secret</i>",
            recovery_address,
            "https://guardians.example/recover",
        );

        assert!(!message.contains("<script>"));
        assert!(!message.contains("href=\"https://evil.test\""));
        assert!(!message.contains("<i>secret</i>"));
        assert!(!message.contains("&RecoveryAddress=GOTHER"));

        assert!(message.contains("<b>&lt;i&gt;secret&lt;/i&gt;</b>"));
        assert!(message.contains(
            "<b>G&quot;&gt;&lt;a href=&quot;https://evil.test&quot;&gt;x&lt;/a&gt;\
             &lt;script&gt;alert(1)&lt;/script&gt;&amp;RecoveryAddress=GOTHER</b>"
        ));
        assert!(message.contains(
            "href=\"https://guardians.example/recover?RecoveryAddress=G%22%3E%3Ca+href%3D\
             %22https%3A%2F%2Fevil.test%22%3Ex%3C%2Fa%3E%3Cscript%3Ealert%281%29%3C%2F\
             script%3E%26RecoveryAddress%3DGOTHER\""
        ));
    }
}
