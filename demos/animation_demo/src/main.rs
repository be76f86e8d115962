use std::time::Duration;

use kinema_core::*;
use kinema_hooks::*;

const FRAME: Duration = Duration::from_millis(16);

/// Fade and slide the card in, settle its color, then pulse twice.
fn card_program(m: &Motion) -> Result<BoxStep, MotionError> {
    let fade = {
        let m = m.clone();
        factory(move || m.animate("opacity", TimingConfig::new(1.0).duration(400.0)))
    };
    let slide = {
        let m = m.clone();
        factory(move || {
            m.animate(
                "offset",
                TimingConfig::tween(0.0, 500.0, Easing::out(Easing::back(Easing::DEFAULT_BACK))),
            )
        })
    };
    let tint = {
        let m = m.clone();
        factory(move || {
            m.animate(
                "color",
                TimingConfig::tween(
                    Color::from_hex("#4CAF50"),
                    300.0,
                    Easing::bezier(0.25, 0.1, 0.25, 1.0)?,
                ),
            )
        })
    };
    let pulse = {
        let m = m.clone();
        factory(move || {
            let (grow, shrink) = (m.clone(), m.clone());
            Ok(m.chain([
                factory(move || {
                    let easing = Easing::in_out(Easing::quad());
                    grow.animate("scale", TimingConfig::tween(1.1, 150.0, easing))
                }),
                factory(move || {
                    let easing = Easing::in_out(Easing::quad());
                    shrink.animate("scale", TimingConfig::tween(1.0, 150.0, easing))
                }),
            ]))
        })
    };
    let enter = {
        let m = m.clone();
        factory(move || Ok(m.parallel([fade.clone(), slide.clone()])))
    };
    let pulses = {
        let m = m.clone();
        factory(move || Ok(m.repeat_n(2, pulse.clone())))
    };

    Ok(m.sequence(100.0, [enter, tint, pulses])?.boxed())
}

fn card() -> SharedGroupBuilder {
    SharedGroup::builder()
        .field("opacity", 0.0f64)
        .field("offset", 48.0f64)
        .field("scale", 1.0f64)
        .field("color", Color::from_hex("#2196F3"))
}

fn render_card(theme: &str) -> anyhow::Result<String> {
    let anim = use_animation("card", theme.to_string(), card(), card_program)?;
    let opacity = anim.value::<f64>("opacity")?.get();
    let offset = anim.value::<f64>("offset")?.get();
    let scale = anim.value::<f64>("scale")?.get();
    let color = anim.value::<Color>("color")?.get();
    Ok(format!(
        "[{theme}] opacity={opacity:.2} offset={offset:6.2} scale={scale:.3} color={} ({:?})",
        color.to_hex(),
        anim.status()
    ))
}

fn app() -> anyhow::Result<String> {
    let theme = use_shared("theme", || "light".to_string());
    render_card(&theme.get())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Starting Animation Demo");

    let frames = FrameLoop::new();
    let clock = SystemClock::new();
    let view = Component::with_frame_loop(&frames);

    let mut frame_count = 0u64;
    loop {
        if view.is_dirty() {
            let line = view.render(app)?;
            log::info!("{line}");
        }

        let running = frames.pump(&clock)?;
        frame_count += 1;
        if running == 0 {
            break;
        }
        std::thread::sleep(FRAME);
    }

    let line = view.render(app)?;
    log::info!("{line}");
    log::info!("Finished after {frame_count} frames ({:.0}ms)", clock.now_ms());

    view.unmount();
    Ok(())
}
