/// Browser shell. The scene itself is rendered server side; the page only
/// swaps in `/scene.svg`, applies scroll requests and forwards the controls.
pub const INDEX: &str = r##"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Kismet Blueprint Visualizer</title>
<style>
  html, body { margin: 0; height: 100%; background: #0b0b0b; color: #e4e4e7; font-family: Inter, sans-serif; }
  header { display: flex; gap: 8px; align-items: center; padding: 8px 12px; border-bottom: 1px solid #27272a; }
  header input[type=text] { flex: 1; background: #18181b; color: inherit; border: 1px solid #3f3f46; padding: 6px 8px; }
  button { background: #1a4e8a; color: #fff; border: 0; padding: 6px 10px; cursor: pointer; }
  #status { font-size: 11px; text-transform: uppercase; letter-spacing: .08em; padding: 2px 8px; border-radius: 8px; background: #27272a; }
  #status.syncing { background: #1c4a2b; }
  #status.error { background: #7a1c1c; }
  #banner { display: none; background: #7a1c1c; padding: 6px 12px; }
  #viewport { position: absolute; top: 48px; bottom: 0; left: 0; right: 0; overflow: auto; }
  #import { display: none; position: fixed; inset: 20% 20%; background: #18181b; padding: 12px; border: 1px solid #3f3f46; }
  #import textarea { width: 100%; height: 80%; background: #0b0b0b; color: inherit; }
</style>
</head>
<body>
<header>
  <form id="gen"><input id="prompt" type="text" placeholder="Describe the blueprint logic"></form>
  <button id="go" form="gen">Generate</button>
  <button id="open-import">Import</button>
  <a href="/api/export"><button>Export</button></a>
  <span id="status">idle</span>
</header>
<div id="banner"><span id="banner-text"></span> <button id="dismiss">Dismiss</button></div>
<div id="viewport"><div id="scene"></div></div>
<div id="import"><textarea id="import-text"></textarea><button id="do-import">Apply</button> <button id="close-import">Cancel</button></div>
<script>
const $ = (id) => document.getElementById(id);
let shownFrame = null;
let lastScroll = null;

async function refreshScene() {
  const resp = await fetch('/scene.svg');
  const svg = await resp.text();
  $('scene').innerHTML = svg;
  shownFrame = resp.headers.get('x-kismet-frame');
}

async function tick() {
  try {
    const state = await (await fetch('/api/state')).json();
    const app = state.app;
    $('status').textContent = app.status;
    $('status').className = app.status;
    $('banner').style.display = app.error ? 'block' : 'none';
    $('banner-text').textContent = app.error || '';
    $('go').disabled = app.generating;
    if (String(state.frame) !== shownFrame) {
      await refreshScene();
    }
    const scroll = JSON.stringify(app.scroll);
    if (app.scroll && scroll !== lastScroll) {
      lastScroll = scroll;
      $('viewport').scrollTo(app.scroll);
    }
  } catch (e) {
    $('status').textContent = 'offline';
    $('status').className = 'error';
  }
}

function reportSize() {
  const vp = $('viewport');
  fetch('/api/viewport', { method: 'POST', headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ width: vp.clientWidth, height: vp.clientHeight }) });
}

$('gen').addEventListener('submit', async (e) => {
  e.preventDefault();
  await fetch('/api/generate', { method: 'POST', headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ prompt: $('prompt').value }) });
  tick();
});
$('dismiss').onclick = async () => { await fetch('/api/dismiss', { method: 'POST' }); tick(); };
$('open-import').onclick = () => { $('import').style.display = 'block'; };
$('close-import').onclick = () => { $('import').style.display = 'none'; };
$('do-import').onclick = async () => {
  const resp = await fetch('/api/import', { method: 'POST', body: $('import-text').value });
  if (resp.ok) $('import').style.display = 'none';
  tick();
};
window.addEventListener('resize', reportSize);
reportSize();
tick();
setInterval(tick, 500);
</script>
</body>
</html>
"##;
