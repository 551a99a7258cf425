//! Landing page markup.
//!
//! A single dark "coming soon" page with a countdown and the contact form.
//! The script lives at [`SCRIPT_PATH`] rather than inline so the
//! Content-Security-Policy can stay at `script-src 'self'`.

/// Path the landing page script is served from.
pub const SCRIPT_PATH: &str = "/assets/landing.js";

/// Values substituted into the page.
#[derive(Debug, Clone)]
pub struct PageSettings {
    /// Shown above the headline.
    pub site_name: String,
    /// Countdown target, RFC 3339.
    pub launch_at: String,
}

/// Render the landing page with `csrf` embedded in the form.
#[must_use]
pub fn render(settings: &PageSettings, csrf: &str) -> String {
    let mut html = String::with_capacity(LANDING_HEAD.len() + LANDING_BODY.len() + 128);
    html.push_str(LANDING_HEAD);
    let body = LANDING_BODY
        .replace("{{SITE_NAME}}", &escape_html(&settings.site_name))
        .replace("{{LAUNCH_AT}}", &escape_html(&settings.launch_at))
        .replace("{{SCRIPT_PATH}}", SCRIPT_PATH)
        .replace("{{CSRF}}", &escape_html(csrf));
    html.push_str(&body);
    html
}

/// Escape text for use in HTML content and quoted attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// HTML head and styles.
const LANDING_HEAD: &str = r##"<!doctype html>
<html lang="es"><head><meta charset="utf-8"/><meta name="viewport" content="width=device-width,initial-scale=1"/>
<title>Teramorphosis</title>
<link rel="preconnect" href="https://fonts.googleapis.com"/>
<link rel="preconnect" href="https://fonts.gstatic.com" crossorigin/>
<link href="https://fonts.googleapis.com/css2?family=Roboto:wght@400;500;700&family=Orbitron:wght@600;700&display=swap" rel="stylesheet"/>
<style>
*,*::before,*::after{box-sizing:border-box;margin:0;padding:0}
:root{--bg:#070b18;--card:rgba(255,255,255,.04);--border:rgba(255,255,255,.08);--text:#e6ecff;--muted:#8b96b8;--accent:#5ef0ff;--accent-2:#b06bff}
body{font-family:Roboto,system-ui,sans-serif;background:radial-gradient(ellipse at top,#121a3a 0%,var(--bg) 60%);color:var(--text);min-height:100vh;line-height:1.6}
.shell{max-width:760px;margin:0 auto;padding:64px 24px}
.card{background:var(--card);border:1px solid var(--border);border-radius:24px;padding:40px;backdrop-filter:blur(8px)}
.overline{font-size:13px;letter-spacing:.2em;text-transform:uppercase;color:var(--accent);margin-bottom:8px}
h1{font-family:Orbitron,sans-serif;font-size:38px;line-height:1.15;margin-bottom:24px}
h1 span{background:linear-gradient(90deg,var(--accent),var(--accent-2));-webkit-background-clip:text;background-clip:text;color:transparent}
.countdown{display:flex;gap:20px;align-items:center;flex-wrap:wrap;margin-bottom:24px}
.countdown ul{display:flex;gap:16px;list-style:none}
.countdown li{text-align:center;font-size:12px;color:var(--muted)}
.countdown li span{display:block;font-family:ui-monospace,monospace;font-size:26px;color:var(--text)}
hr{border:0;border-top:1px solid var(--border);margin:24px 0}
.lead{color:var(--muted);margin-bottom:24px}
form{display:grid;grid-template-columns:1fr 1fr;gap:16px}
.full{grid-column:1/-1}
label{display:block;font-size:14px;margin-bottom:6px}
input,textarea{width:100%;padding:12px 14px;border-radius:12px;border:1px solid var(--border);background:rgba(0,0,0,.3);color:var(--text);font:inherit}
input:focus,textarea:focus{outline:2px solid var(--accent);outline-offset:1px}
.actions{display:flex;justify-content:space-between;align-items:center;gap:12px;flex-wrap:wrap}
.actions small{color:var(--muted)}
button{padding:12px 32px;border-radius:999px;border:0;background:linear-gradient(90deg,var(--accent),var(--accent-2));color:#061022;font-weight:700;font-size:16px;cursor:pointer}
.status{margin-top:8px;min-height:1.5em}
.status.ok{color:#6bffb0}.status.err{color:#ff8a8a}
@media(max-width:640px){form{grid-template-columns:1fr}h1{font-size:28px}.card{padding:24px}}
</style></head>
"##;

/// HTML body. Placeholders are replaced by [`render`].
const LANDING_BODY: &str = r##"<body>
<main class="shell">
  <section id="coming-soon" class="card" aria-labelledby="title" data-target="{{LAUNCH_AT}}">
    <p class="overline">{{SITE_NAME}}</p>
    <h1 id="title">Estamos construyendo algo <span>futurista</span></h1>
    <div class="countdown" role="timer" aria-live="polite">
      <strong>Lanzamiento estimado:</strong>
      <ul>
        <li><span data-days>00</span>días</li>
        <li><span data-hours>00</span>horas</li>
        <li><span data-minutes>00</span>min</li>
        <li><span data-seconds>00</span>s</li>
      </ul>
    </div>
    <hr/>
    <p class="lead">La web aún no está lista, pero puedes <strong>contactarnos</strong> y te avisamos en cuanto lancemos.</p>
    <form id="contact-form" method="post" action="./" aria-describedby="contact-help" novalidate>
      <input type="hidden" name="csrf" value="{{CSRF}}"/>
      <div><label for="firstName">Nombre</label><input id="firstName" name="firstName" type="text" maxlength="120" autocomplete="given-name" required/></div>
      <div><label for="lastName">Apellidos</label><input id="lastName" name="lastName" type="text" maxlength="120" autocomplete="family-name"/></div>
      <div class="full"><label for="email">Email</label><input id="email" name="email" type="email" maxlength="254" autocomplete="email" required/></div>
      <div class="full"><label for="message">Mensaje</label><textarea id="message" name="message" rows="4" maxlength="2000" required></textarea></div>
      <div class="full actions">
        <small id="contact-help">Protegemos tus datos. No compartimos tu información.</small>
        <button type="submit">Enviar</button>
      </div>
      <div id="form-status" class="full status" aria-live="polite" aria-atomic="true"></div>
    </form>
  </section>
</main>
<script src="{{SCRIPT_PATH}}" defer></script>
</body></html>
"##;

/// Countdown and `fetch` submission. Server messages are inserted with
/// `textContent`, never as HTML.
pub const LANDING_SCRIPT: &str = r#"(() => {
  const section = document.getElementById('coming-soon');
  const target = section ? new Date(section.dataset.target).getTime() : NaN;
  if (!Number.isNaN(target)) {
    const el = {
      d: section.querySelector('[data-days]'),
      h: section.querySelector('[data-hours]'),
      m: section.querySelector('[data-minutes]'),
      s: section.querySelector('[data-seconds]'),
    };
    const pad = (n) => String(n).padStart(2, '0');
    const tick = () => {
      let diff = Math.max(0, target - Date.now());
      const days = Math.floor(diff / 86400000); diff -= days * 86400000;
      const hours = Math.floor(diff / 3600000); diff -= hours * 3600000;
      const minutes = Math.floor(diff / 60000); diff -= minutes * 60000;
      const seconds = Math.floor(diff / 1000);
      el.d.textContent = pad(days);
      el.h.textContent = pad(hours);
      el.m.textContent = pad(minutes);
      el.s.textContent = pad(seconds);
    };
    tick();
    setInterval(tick, 1000);
  }

  const form = document.getElementById('contact-form');
  const status = document.getElementById('form-status');
  if (!form || !status) return;

  const show = (text, ok) => {
    status.textContent = text;
    status.className = 'full status ' + (ok ? 'ok' : 'err');
  };

  form.addEventListener('submit', async (event) => {
    event.preventDefault();
    if (!form.checkValidity()) { form.reportValidity(); return; }
    show('Enviando...', true);
    try {
      const res = await fetch('./', {
        method: 'POST',
        body: new FormData(form),
        headers: { 'X-Requested-With': 'fetch' },
        cache: 'no-store',
        credentials: 'same-origin',
      });
      let data;
      try { data = await res.json(); } catch { data = { ok: false, error: 'invalid response' }; }
      if (res.ok && data.ok) {
        show(data.message, true);
        form.reset();
      } else {
        show(data.error || 'error', false);
      }
    } catch {
      show('network error', false);
    }
  });
})();
"#;
