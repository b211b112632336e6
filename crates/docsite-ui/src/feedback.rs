//! Inline page feedback with emoji buttons.

use docsite_core::{FeedbackConfig, FeedbackEvent, FeedbackState, Rating};
use leptos::prelude::*;

/// Emoji rating widget shown at the end of a page.
#[component]
pub fn FeedbackWidget(
    /// Slug of the page being rated.
    #[prop(into)]
    page: Signal<String>,
    /// Receives every new rating.
    #[prop(default = None)]
    on_feedback: Option<Callback<FeedbackEvent>>,
) -> impl IntoView {
    let config = use_context::<FeedbackConfig>().unwrap_or_default();
    if !config.enabled {
        return ().into_any();
    }

    let state = RwSignal::new(FeedbackState::default());

    // A rating belongs to one page.
    Effect::new(move |previous: Option<String>| {
        let page = page.get();
        if previous.is_some_and(|previous| previous != page) {
            state.update(FeedbackState::reset);
        }
        page
    });

    let selected = Memo::new(move |_| state.with(FeedbackState::selected));
    let FeedbackConfig { prompt, thanks, .. } = config;
    let label = prompt.clone();

    view! {
      <div class="docsite-feedback" role="group" aria-label=label>
        <span class="docsite-feedback-prompt">{prompt}</span>
        {Rating::ALL
          .into_iter()
          .map(|rating| {
            let is_selected = move || selected.get() == Some(rating);
            view! {
              <button
                type="button"
                class="docsite-feedback-emoji"
                class:selected=is_selected
                title=rating.label()
                aria-label=rating.label()
                aria-pressed=move || is_selected().to_string()
                on:click=move |_| {
                  let event = state
                    .try_update(|state| state.select(&page.get_untracked(), rating))
                    .flatten();
                  if let (Some(event), Some(on_feedback)) = (event, on_feedback) {
                    on_feedback.run(event);
                  }
                }
              >
                {rating.emoji()}
              </button>
            }
          })
          .collect_view()}
        <Show when=move || selected.get().is_some()>
          <span class="docsite-feedback-thanks" role="status">
            {thanks.clone()}
          </span>
        </Show>
      </div>
    }
    .into_any()
}
