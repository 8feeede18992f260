//! Landing page
//!
//! Stateless presentation: hero, three feature cards, a three-step
//! explainer and a footer. The two share intents are plain anchors the
//! frontend wires to its share flows; nothing here touches the store.

use axum::response::Html;

const LANDING_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Blink - share secrets that vanish</title>
  <style>
    body { font-family: system-ui, sans-serif; margin: 0; color: #1a1a2e; }
    main { max-width: 960px; margin: 0 auto; padding: 0 1.5rem; }
    .hero { text-align: center; padding: 5rem 0 3rem; }
    .hero h1 { font-size: 2.5rem; margin-bottom: 0.5rem; }
    .hero p { color: #555; }
    .cta { display: inline-block; margin: 0.5rem; padding: 0.75rem 1.5rem;
           border-radius: 8px; text-decoration: none; font-weight: 600; }
    .cta-primary { background: #4f46e5; color: #fff; }
    .cta-secondary { border: 1px solid #4f46e5; color: #4f46e5; }
    .features { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1.5rem; padding: 2rem 0; }
    .card { border: 1px solid #e5e7eb; border-radius: 12px; padding: 1.5rem; }
    .steps { padding: 2rem 0; }
    .steps ol { line-height: 2; }
    footer { text-align: center; color: #888; padding: 2rem 0; border-top: 1px solid #e5e7eb; }
  </style>
</head>
<body>
  <main>
    <section class="hero">
      <h1>Share secrets that vanish</h1>
      <p>Encrypted notes and files with one-time viewing and automatic expiry.</p>
      <a class="cta cta-primary" href="/#share-text">Share text</a>
      <a class="cta cta-secondary" href="/#share-file">Share a file</a>
    </section>
    <section class="features">
      <div class="card">
        <h3>End-to-end encrypted</h3>
        <p>Secrets are encrypted in your browser before they ever leave it.</p>
      </div>
      <div class="card">
        <h3>Auto-destruct</h3>
        <p>Every secret expires on a timer, whether or not it was opened.</p>
      </div>
      <div class="card">
        <h3>One-time view</h3>
        <p>A secret is destroyed the moment it is read.</p>
      </div>
    </section>
    <section class="steps">
      <h2>How it works</h2>
      <ol>
        <li>Paste a note or pick a file and set an expiry.</li>
        <li>Send the generated link to your recipient.</li>
        <li>They open it once, then it is gone for good.</li>
      </ol>
    </section>
    <footer>
      <p>Blink - self-destructing secret sharing</p>
    </footer>
  </main>
</body>
</html>
"##;

/// `GET /` serves static landing markup. No auth, no state.
pub async fn landing_page() -> Html<&'static str> {
    Html(LANDING_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn landing_renders_hero_features_and_intents() {
        let Html(body) = landing_page().await;
        assert!(body.contains("Share secrets that vanish"));
        assert!(body.contains("/#share-text"));
        assert!(body.contains("/#share-file"));
        assert!(body.contains("End-to-end encrypted"));
        assert!(body.contains("Auto-destruct"));
        assert!(body.contains("One-time view"));
        assert!(body.contains("How it works"));
    }
}
